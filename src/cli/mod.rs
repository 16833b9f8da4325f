//! CLI module for statdash
//!
//! Command-line interface definitions and handlers for the statistics console.
//!
//! # Commands
//!
//! - `watch` - Connect to the statistics stream and render live updates
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Watch the default local endpoint
//! statdash watch
//!
//! # Watch a remote endpoint with debug logging
//! statdash watch --endpoint wss://ops.example/ws/statistics --log-level debug
//!
//! # Generate shell completions
//! statdash completions bash > ~/.bash_completion.d/statdash
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// statdash - Real-time statistics console
#[derive(Parser, Debug)]
#[command(
    name = "statdash",
    version,
    about = "Terminal console for the real-time statistics stream"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the statistics stream
    Watch(WatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "statdash.toml")]
    pub config: PathBuf,

    /// Override stream endpoint
    #[arg(short, long, env = "STATDASH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override subscription channel
    #[arg(long, env = "STATDASH_CHANNEL")]
    pub channel: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STATDASH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Screen refresh period in milliseconds
    #[arg(long, default_value = "1000")]
    pub refresh_ms: u64,

    /// Emit one JSON state object per refresh instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "statdash.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

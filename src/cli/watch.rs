//! Watch command implementation

use crate::cli::{output, WatchArgs};
use crate::config::{ConsoleConfig, LogFormat};
use crate::stats::StatsMonitor;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &WatchArgs,
) -> Result<ConsoleConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        ConsoleConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ConsoleConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(ref endpoint) = args.endpoint {
        config.stream.endpoint = endpoint.clone();
    }
    if let Some(ref channel) = args.channel {
        config.stream.channel = channel.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Handle `statdash watch` command
///
/// Connects to the statistics stream and re-renders the console on a
/// fixed cadence until Ctrl-C. An initial connection failure is shown on
/// screen rather than aborting, so an operator can see what went wrong.
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let monitor = StatsMonitor::new(&config.stream)?;
    if let Err(e) = monitor.start().await {
        tracing::error!(error = %e, endpoint = %config.stream.endpoint, "Initial connection failed");
    }

    let store = monitor.store();
    let socket = monitor.socket().clone();
    let mut refresh = tokio::time::interval(Duration::from_millis(args.refresh_ms.max(100)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            _ = refresh.tick() => {
                if args.json {
                    println!("{}", output::format_state_json(&store, socket.status()));
                } else {
                    // Clear screen and repaint from the top
                    print!("\x1B[2J\x1B[1;1H");
                    println!("{}", output::format_dashboard(&store, socket.status()));
                }
            }
        }
    }

    monitor.shutdown();
    Ok(())
}

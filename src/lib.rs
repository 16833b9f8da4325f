//! Statdash - Real-time statistics dashboard client
//!
//! This library provides the core functionality for consuming a push-based
//! statistics stream over WebSocket and maintaining live dashboard state.

pub mod cli;
pub mod config;
pub mod logging;
pub mod stats;
pub mod ws;

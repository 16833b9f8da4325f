//! Tracing filter helpers
//!
//! The configured level applies to this crate; dependencies are capped
//! at `warn` so transport internals stay quiet at `debug` and below.

use crate::config::LoggingConfig;

/// Build filter directives string from LoggingConfig
///
/// # Examples
///
/// ```rust
/// use statdash::config::LoggingConfig;
/// use statdash::logging::build_filter_directives;
///
/// let config = LoggingConfig::default();
/// assert_eq!(build_filter_directives(&config), "warn,statdash=info");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    format!("warn,statdash={}", config.level)
}

//! Ambient configuration for the calendar libraries.
//!
//! Loaded once at process start from environment variables (and an
//! optional `config.toml`), the way a long-running service would load
//! its settings. A library caller embedding `calcore-rfc` in something
//! that is not itself config-driven can skip this and construct the
//! pieces it needs directly; `Settings::load` exists for binaries and
//! test harnesses that want the usual precedence rules.

use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub recurrence: RecurrenceConfig,
    pub timezone: TimezoneConfig,
    pub logging: LoggingConfig,
}

/// Bounds on the recurrence engine's expansion work.
///
/// Mirrors the ceilings the engine applies unconditionally; overriding
/// them here is for test harnesses that want tighter bounds, not a way
/// to disable the protection they give production callers.
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub max_interval_iterations: u32,
    pub max_aggregator_passes: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_interval_iterations: 10_000,
            max_aggregator_passes: 1_000,
        }
    }
}

/// Horizon used when materializing transitions for open-ended VTIMEZONE
/// rules (zones whose DAYLIGHT/STANDARD sub-components carry an RRULE
/// with no UNTIL/COUNT).
#[derive(Debug, Clone, Deserialize)]
pub struct TimezoneConfig {
    pub horizon_years: u32,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self { horizon_years: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads configuration from `.env` file and environment variables.
    /// Environment variables take precedence over file-sourced values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("recurrence.max_interval_iterations", 10_000)?
            .set_default("recurrence.max_aggregator_passes", 1_000)?
            .set_default("timezone.horizon_years", 20)?
            .set_default("logging.level", "info")?
            .add_source(
                config::Environment::default()
                    .prefix("CALCORE")
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_config_defaults() {
        let cfg = RecurrenceConfig::default();
        assert_eq!(cfg.max_interval_iterations, 10_000);
        assert_eq!(cfg.max_aggregator_passes, 1_000);
    }

    #[test]
    fn timezone_config_defaults() {
        assert_eq!(TimezoneConfig::default().horizon_years, 20);
    }
}

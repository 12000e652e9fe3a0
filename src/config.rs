//! Configuration management module
//!
//! Loads and validates environment-based configuration. Base risk
//! thresholds come from `THRESHOLD_*` variables layered over the defaults.

use ::config::{Config, Environment};
use serde::Deserialize;
use std::env;
use thiserror::Error;

use crate::thresholds::ThresholdSet;
use crate::validation::validate_thresholds;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid number format in environment variable {0}")]
    ParseError(&'static str),

    #[error("Failed to load thresholds: {0}")]
    ThresholdSource(#[from] ::config::ConfigError),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Weather provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSettings {
    /// OpenWeatherMap key; the address flow is disabled without it
    pub api_key: Option<String>,
    pub base_url: String,
    /// Bound on each outbound request
    pub timeout_secs: u64,
    /// Used when a forecast document carries no `city.timezone`
    pub default_utc_offset_secs: i32,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub weather: WeatherSettings,
    pub thresholds: ThresholdSet,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = parse_var("SERVER_PORT", "8080")?;
        let timeout_secs = parse_var("WEATHER_TIMEOUT_SECS", "10")?;
        let default_utc_offset_secs = parse_var("DEFAULT_UTC_OFFSET_SECS", "0")?;

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            weather: WeatherSettings {
                api_key: env::var("OPENWEATHERMAP_API_KEY").ok(),
                base_url: env::var("OPENWEATHERMAP_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openweathermap.org".into()),
                timeout_secs,
                default_utc_offset_secs,
            },
            thresholds: load_thresholds()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, SettingsError> {
    env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .map_err(|_| SettingsError::ParseError(name))
}

/// Base thresholds from `THRESHOLD_*` environment variables.
///
/// e.g. `THRESHOLD_HEATWAVE_TEMP_C=36`; unset keys keep their defaults.
pub fn load_thresholds() -> Result<ThresholdSet, SettingsError> {
    let thresholds: ThresholdSet = Config::builder()
        .add_source(Environment::with_prefix("THRESHOLD").try_parsing(true))
        .build()?
        .try_deserialize()?;

    validate_thresholds(&thresholds)
        .map_err(|e| SettingsError::InvalidThresholds(e.to_string()))?;

    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        env::remove_var("SERVER_HOST");
        env::remove_var("OPENWEATHERMAP_BASE_URL");

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(settings.weather.timeout_secs, 10);
        assert_eq!(settings.thresholds.drought_risk_days, 7);
    }

    #[test]
    fn test_custom_settings() {
        env::set_var("SERVER_PORT", "3000");
        env::set_var("DEFAULT_UTC_OFFSET_SECS", "19800");

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.weather.default_utc_offset_secs, 19_800);

        env::remove_var("SERVER_PORT");
        env::remove_var("DEFAULT_UTC_OFFSET_SECS");
    }

    #[test]
    fn test_threshold_override_from_env() {
        env::set_var("THRESHOLD_HEATWAVE_TEMP_C", "36.5");

        let thresholds = load_thresholds().unwrap();

        assert_eq!(thresholds.heatwave_temp_c, 36.5);
        assert_eq!(thresholds.frost_risk_temp_c, 2.0);

        env::remove_var("THRESHOLD_HEATWAVE_TEMP_C");
    }

    #[test]
    fn test_invalid_number() {
        env::set_var("CROPWATCH_TEST_NUMBER", "soon");
        let result: Result<u64, _> = parse_var("CROPWATCH_TEST_NUMBER", "1");
        env::remove_var("CROPWATCH_TEST_NUMBER");

        assert!(matches!(result, Err(SettingsError::ParseError("CROPWATCH_TEST_NUMBER"))));
        assert_eq!(parse_var::<u64>("CROPWATCH_TEST_UNSET", "7").unwrap(), 7);
    }
}

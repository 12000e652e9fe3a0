//! Application state management
//!
//! Read-only state shared by request handlers. Every assessment builds its own
//! thresholds, summaries and report, so nothing here is mutated after startup.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::info;

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::thresholds::ThresholdSet;
use crate::weather::OpenWeatherClient;

/// Central application state
pub struct AppState {
    /// Base thresholds before crop/stage adjustment
    base_thresholds: ThresholdSet,
    /// Offset used when a forecast carries no timezone
    default_offset: FixedOffset,
    /// Present only when an API key is configured
    weather: Option<OpenWeatherClient>,
    /// Application start time
    start_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        base_thresholds: ThresholdSet,
        default_offset: FixedOffset,
        weather: Option<OpenWeatherClient>,
    ) -> Self {
        info!(
            weather_api_configured = weather.is_some(),
            "Initializing application state"
        );
        Self {
            base_thresholds,
            default_offset,
            weather,
            start_time: Utc::now(),
        }
    }

    /// Build state from loaded settings
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        let default_offset = FixedOffset::east_opt(settings.weather.default_utc_offset_secs)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "DEFAULT_UTC_OFFSET_SECS {} is out of range",
                    settings.weather.default_utc_offset_secs
                ))
            })?;
        let weather = OpenWeatherClient::from_settings(&settings.weather)?;

        Ok(Self::new(settings.thresholds.clone(), default_offset, weather))
    }

    pub fn base_thresholds(&self) -> &ThresholdSet {
        &self.base_thresholds
    }

    pub fn default_offset(&self) -> FixedOffset {
        self.default_offset
    }

    /// Weather client, or a configuration error when no API key is set
    pub fn weather(&self) -> AppResult<&OpenWeatherClient> {
        self.weather.as_ref().ok_or_else(|| {
            AppError::ConfigurationError("OPENWEATHERMAP_API_KEY is not set".to_string())
        })
    }

    pub fn weather_configured(&self) -> bool {
        self.weather.is_some()
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            ThresholdSet::default(),
            Utc.fix(),
            None,
        )
    }
}

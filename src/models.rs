//! Data models for forecast samples and API payloads
//!
//! Defines the core data structures used throughout the application.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::risk::RiskReport;
use crate::thresholds::{crops, stages, ThresholdSet};
use crate::weather::GeoLocation;

/// One sub-daily forecast entry (OpenWeatherMap 3-hour forecast shape).
///
/// Every nested block is optional; a missing block reads as missing values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Epoch seconds (UTC)
    pub dt: Option<f64>,
    pub main: Option<MainConditions>,
    pub wind: Option<WindConditions>,
    pub rain: Option<RainVolume>,
}

/// Temperature and humidity block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MainConditions {
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindConditions {
    /// Meters per second with metric units
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RainVolume {
    /// Rainfall over the 3-hour interval (mm)
    #[serde(rename = "3h")]
    pub three_hour: Option<f64>,
}

impl ForecastSample {
    pub fn temp_max(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.temp_max)
    }

    pub fn temp_min(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.temp_min)
    }

    pub fn humidity(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.humidity)
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.wind.as_ref().and_then(|w| w.speed)
    }

    /// Interval rainfall, 0 when absent
    pub fn rain_3h(&self) -> f64 {
        self.rain.as_ref().and_then(|r| r.three_hour).unwrap_or(0.0)
    }
}

fn default_crop() -> String {
    crops::OTHER.to_string()
}

fn default_stage() -> String {
    stages::VEGETATIVE.to_string()
}

/// Input DTO for assessing a supplied forecast document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssessRequest {
    /// Raw forecast document; odd shapes degrade to an empty report
    #[serde(default)]
    pub forecast: serde_json::Value,

    #[serde(default = "default_crop")]
    #[validate(length(min = 1, max = 64, message = "crop_type must be 1-64 characters"))]
    pub crop_type: String,

    #[serde(default = "default_stage")]
    #[validate(length(min = 1, max = 64, message = "growth_stage must be 1-64 characters"))]
    pub growth_stage: String,

    /// Reference date for the evaluation window (defaults to the forecast's local today)
    pub today: Option<NaiveDate>,
}

/// Input DTO for the address-driven advisory flow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdvisoryRequest {
    #[validate(length(min = 1, max = 200, message = "address must be 1-200 characters"))]
    pub address: String,

    #[serde(default = "default_crop")]
    #[validate(length(min = 1, max = 64, message = "crop_type must be 1-64 characters"))]
    pub crop_type: String,

    #[serde(default = "default_stage")]
    #[validate(length(min = 1, max = 64, message = "growth_stage must be 1-64 characters"))]
    pub growth_stage: String,
}

/// Query parameters for the effective thresholds endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdQuery {
    #[serde(default = "default_crop")]
    pub crop_type: String,
    #[serde(default = "default_stage")]
    pub growth_stage: String,
}

/// Result of one full assessment
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub crop_type: String,
    pub growth_stage: String,
    pub today: NaiveDate,
    pub thresholds: ThresholdSet,
    pub risks: RiskReport,
    pub advisories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub weather_api_configured: bool,
}

//! Risk thresholds and crop/stage adjustments
//!
//! Holds the numeric cutoffs that decide when a forecast condition counts as
//! risky, and derives a per-request set tuned to the crop and growth stage.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Known crop identifiers that carry adjustment rules
pub mod crops {
    pub const RICE: &str = "Rice";
    pub const MAIZE: &str = "Maize";
    pub const VEGETABLES: &str = "Vegetables";
    pub const OTHER: &str = "Other";
}

/// Known growth stage identifiers
pub mod stages {
    pub const GERMINATION_SEEDLING: &str = "Germination/Seedling";
    pub const VEGETATIVE: &str = "Vegetative";
    pub const FLOWERING: &str = "Flowering";
    pub const FRUITING_MATURITY: &str = "Fruiting/Maturity";

    /// Stages where yield is most sensitive to heat and water stress
    pub const SENSITIVE: [&str; 2] = [FLOWERING, FRUITING_MATURITY];

    pub fn is_sensitive(stage: &str) -> bool {
        SENSITIVE.contains(&stage)
    }
}

/// Effective thresholds for one assessment.
///
/// Missing keys in any deserialized source fall back to [`ThresholdSet::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ThresholdSet {
    /// Consecutive dry days before drought is flagged
    #[validate(range(min = 1, message = "drought_risk_days must be at least 1"))]
    pub drought_risk_days: u32,

    /// Daily rainfall (mm) at or below which a day counts as dry
    #[validate(range(min = 0.0, max = 1000.0))]
    pub drought_risk_mm: f64,

    /// Daily rainfall (mm) at or above which flooding is flagged
    #[validate(range(min = 0.0, max = 2000.0))]
    pub flood_risk_mm_per_day: f64,

    /// Single 3-hour rainfall (mm) at or above which a burst is flagged
    #[validate(range(min = 0.0, max = 1000.0))]
    pub heavy_rain_mm_per_3h: f64,

    /// Daily maximum (°C) at or above which a day counts as hot
    #[validate(range(min = -60.0, max = 70.0))]
    pub heatwave_temp_c: f64,

    /// Consecutive hot days before a heatwave is flagged
    #[validate(range(min = 1, message = "heatwave_days must be at least 1"))]
    pub heatwave_days: u32,

    /// Daily minimum (°C) at or below which frost is flagged
    #[validate(range(min = -60.0, max = 70.0))]
    pub frost_risk_temp_c: f64,

    /// Peak wind speed (m/s) at or above which high wind is flagged
    #[validate(range(min = 0.0, max = 150.0))]
    pub high_wind_speed_ms: f64,

    /// Relative humidity (%) counted as high
    #[validate(range(min = 0.0, max = 100.0))]
    pub high_humidity_perc: f64,

    /// Hours of high humidity in one day before it is flagged
    #[validate(range(min = 0.0, max = 24.0))]
    pub high_humidity_duration_h: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            drought_risk_days: 7,
            drought_risk_mm: 2.0,
            flood_risk_mm_per_day: 50.0,
            heavy_rain_mm_per_3h: 15.0,
            heatwave_temp_c: 38.0,
            heatwave_days: 3,
            frost_risk_temp_c: 2.0,
            high_wind_speed_ms: 15.0,
            high_humidity_perc: 85.0,
            high_humidity_duration_h: 12.0,
        }
    }
}

/// Derive the effective thresholds for a crop at a growth stage.
///
/// Rules run in a fixed order and each reads the values left by the
/// previous one, so e.g. Rice at Flowering gets `7 - 2 + 3` drought days.
pub fn adjust(base: &ThresholdSet, crop: &str, stage: &str) -> ThresholdSet {
    info!(crop = %crop, stage = %stage, "Adjusting thresholds");

    let mut adjusted = base.clone();

    if stages::is_sensitive(stage) {
        adjusted.heatwave_temp_c = (adjusted.heatwave_temp_c - 3.0).max(32.0);
        adjusted.drought_risk_days = adjusted.drought_risk_days.saturating_sub(2).max(3);
        debug!("Applied higher sensitivity for flowering/fruiting stages");
    }

    if crop == crops::RICE && stage != stages::GERMINATION_SEEDLING {
        adjusted.drought_risk_days = adjusted.drought_risk_days.saturating_add(3).min(10);
        debug!("Applied lower drought sensitivity for rice");
    }

    if crop == crops::VEGETABLES && stage == stages::GERMINATION_SEEDLING {
        adjusted.frost_risk_temp_c = (adjusted.frost_risk_temp_c + 1.0).max(3.0);
        debug!("Applied higher frost sensitivity for vegetable seedlings");
    }

    if crop == crops::MAIZE && stage == stages::FRUITING_MATURITY {
        adjusted.high_wind_speed_ms = (adjusted.high_wind_speed_ms - 3.0).max(10.0);
        debug!("Applied higher wind sensitivity for mature maize");
    }

    info!(thresholds = ?adjusted, "Final adjusted thresholds");
    adjusted
}

//! Input validation module
//!
//! Validates API inputs and threshold sets. Unknown crops and stages are
//! accepted (they simply match no adjustment rule) but logged.

use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::models::{AdvisoryRequest, AssessRequest};
use crate::thresholds::{crops, stages, ThresholdSet};

pub const KNOWN_CROPS: [&str; 4] = [crops::RICE, crops::MAIZE, crops::VEGETABLES, crops::OTHER];

pub const KNOWN_STAGES: [&str; 4] = [
    stages::GERMINATION_SEEDLING,
    stages::VEGETATIVE,
    stages::FLOWERING,
    stages::FRUITING_MATURITY,
];

/// Flatten field errors into one client-safe message
fn describe(validation_errors: &ValidationErrors) -> String {
    let mut error_messages: Vec<String> = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let msgs: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, msgs.join(", "))
        })
        .collect();
    error_messages.sort();
    error_messages.join("; ")
}

/// Validate an offline assessment request
pub fn validate_assess_request(input: &AssessRequest) -> AppResult<()> {
    if let Err(validation_errors) = input.validate() {
        let message = describe(&validation_errors);
        warn!(errors = %message, "Assessment request validation failed");
        return Err(AppError::ValidationError(message));
    }

    check_crop_and_stage(&input.crop_type, &input.growth_stage);
    debug!("Assessment request validation passed");
    Ok(())
}

/// Validate an address-driven advisory request
pub fn validate_advisory_request(input: &AdvisoryRequest) -> AppResult<()> {
    if input.address.trim().is_empty() {
        return Err(AppError::ValidationError(
            "address: Please enter a location".to_string(),
        ));
    }

    if let Err(validation_errors) = input.validate() {
        let message = describe(&validation_errors);
        warn!(errors = %message, "Advisory request validation failed");
        return Err(AppError::ValidationError(message));
    }

    check_crop_and_stage(&input.crop_type, &input.growth_stage);
    debug!("Advisory request validation passed");
    Ok(())
}

/// Validate a threshold set; invalid sets are usage errors
pub fn validate_thresholds(thresholds: &ThresholdSet) -> AppResult<()> {
    if let Err(validation_errors) = thresholds.validate() {
        return Err(AppError::ValidationError(describe(&validation_errors)));
    }

    let values = [
        thresholds.drought_risk_mm,
        thresholds.flood_risk_mm_per_day,
        thresholds.heavy_rain_mm_per_3h,
        thresholds.heatwave_temp_c,
        thresholds.frost_risk_temp_c,
        thresholds.high_wind_speed_ms,
        thresholds.high_humidity_perc,
        thresholds.high_humidity_duration_h,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::ValidationError(
            "Thresholds must be finite numbers".to_string(),
        ));
    }

    Ok(())
}

fn check_crop_and_stage(crop: &str, stage: &str) {
    if !KNOWN_CROPS.contains(&crop) {
        warn!(crop = %crop, "Unknown crop type; no crop-specific adjustments apply");
    }
    if !KNOWN_STAGES.contains(&stage) {
        warn!(stage = %stage, "Unknown growth stage; no stage-specific adjustments apply");
    }
}

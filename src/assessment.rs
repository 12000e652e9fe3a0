//! End-to-end assessment pipeline
//!
//! thresholds → daily aggregation → risk evaluation → advisories, for one
//! forecast document.

use chrono::{FixedOffset, NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

use crate::advisory::compose;
use crate::models::AssessmentResponse;
use crate::risk::{assess, document_offset};
use crate::thresholds::{adjust, ThresholdSet};
use crate::weather::GeoLocation;

/// Everything one assessment needs besides the forecast itself
#[derive(Debug, Clone)]
pub struct AssessmentContext<'a> {
    pub base_thresholds: &'a ThresholdSet,
    pub crop: &'a str,
    pub stage: &'a str,
    /// Fallback when the document has no `city.timezone`
    pub default_offset: FixedOffset,
    /// Reference date; `None` means the current date at the forecast's offset
    pub today: Option<NaiveDate>,
}

/// Run the full pipeline over a raw forecast document
pub fn run(
    document: &Value,
    ctx: &AssessmentContext<'_>,
    location: Option<GeoLocation>,
) -> AssessmentResponse {
    let offset = document_offset(document).unwrap_or(ctx.default_offset);
    let today = ctx
        .today
        .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

    info!(
        crop = %ctx.crop,
        stage = %ctx.stage,
        offset_secs = offset.local_minus_utc(),
        today = %today,
        "Running climate risk assessment"
    );

    let thresholds = adjust(ctx.base_thresholds, ctx.crop, ctx.stage);
    let risks = assess(document, &thresholds, offset, today);
    let advisories = compose(Some(&risks), ctx.crop, ctx.stage);

    AssessmentResponse {
        crop_type: ctx.crop.to_string(),
        growth_stage: ctx.stage.to_string(),
        today,
        thresholds,
        risks,
        advisories,
        location,
    }
}

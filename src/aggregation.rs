//! Daily aggregation of sub-daily forecast samples
//!
//! Folds 3-hourly samples into one summary per local calendar date.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::ForecastSample;

/// Reasons a single forecast entry is skipped
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("entry is not a record")]
    NotARecord,

    #[error("missing 'dt' timestamp")]
    MissingTimestamp,

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(f64),

    #[error("malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Aggregated conditions for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub max_temp: f64,
    pub min_temp: f64,
    pub total_rain: f64,
    pub max_wind_speed: f64,
    /// One entry per sample; `None` where the sample had no humidity
    pub humidity_readings: Vec<Option<f64>>,
    /// Positive interval rainfall amounts
    pub rain_interval_samples: Vec<f64>,
    pub sample_count: usize,
}

impl DailySummary {
    pub fn new() -> Self {
        Self {
            max_temp: f64::NEG_INFINITY,
            min_temp: f64::INFINITY,
            total_rain: 0.0,
            max_wind_speed: 0.0,
            humidity_readings: Vec::new(),
            rain_interval_samples: Vec::new(),
            sample_count: 0,
        }
    }

    /// Fold one sample into the running aggregates
    pub fn fold(&mut self, sample: &ForecastSample) {
        if let Some(t) = sample.temp_max() {
            self.max_temp = self.max_temp.max(t);
        }
        if let Some(t) = sample.temp_min() {
            self.min_temp = self.min_temp.min(t);
        }

        let rain = sample.rain_3h();
        self.total_rain += rain;
        if rain > 0.0 {
            self.rain_interval_samples.push(rain);
        }

        self.max_wind_speed = self.max_wind_speed.max(sample.wind_speed().unwrap_or(0.0));
        self.humidity_readings.push(sample.humidity());
        self.sample_count += 1;
    }

    /// Largest single-interval rainfall of the day, 0 when it never rained
    pub fn max_interval_rain(&self) -> f64 {
        self.rain_interval_samples.iter().copied().fold(0.0, f64::max)
    }
}

impl Default for DailySummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one raw entry and resolve its local calendar date
pub fn parse_sample(
    entry: &Value,
    offset: FixedOffset,
) -> Result<(NaiveDate, ForecastSample), SampleError> {
    if !entry.is_object() {
        return Err(SampleError::NotARecord);
    }

    let sample: ForecastSample = serde_json::from_value(entry.clone())?;
    let ts = sample.dt.ok_or(SampleError::MissingTimestamp)?;

    if !ts.is_finite() {
        return Err(SampleError::InvalidTimestamp(ts));
    }

    let date = DateTime::from_timestamp(ts.floor() as i64, 0)
        .ok_or(SampleError::InvalidTimestamp(ts))?
        .with_timezone(&offset)
        .date_naive();

    Ok((date, sample))
}

/// Group raw forecast entries into ordered per-day summaries.
///
/// Entries that cannot be read are logged and skipped.
pub fn aggregate(entries: &[Value], offset: FixedOffset) -> BTreeMap<NaiveDate, DailySummary> {
    info!(
        entries = entries.len(),
        "Aggregating 3-hourly forecast data into daily summaries"
    );

    let mut daily: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for (index, entry) in entries.iter().enumerate() {
        match parse_sample(entry, offset) {
            Ok((date, sample)) => {
                daily.entry(date).or_default().fold(&sample);
            }
            Err(e) => {
                warn!(entry = index, error = %e, "Skipping forecast entry");
            }
        }
    }

    debug!(days = daily.len(), "Processed daily summaries");
    daily
}

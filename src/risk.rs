//! Climate risk evaluation
//!
//! Walks daily forecast summaries in date order and applies per-day and
//! consecutive-day rules against the effective thresholds.

use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

use crate::aggregation::{aggregate, DailySummary};
use crate::thresholds::ThresholdSet;

/// Number of upcoming days considered by one evaluation
pub const FORECAST_HORIZON_DAYS: usize = 5;

/// Hours covered by one forecast sample
pub const SAMPLE_INTERVAL_HOURS: u32 = 3;

/// Risk categories in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Drought,
    FloodHeavyRain,
    Heatwave,
    Frost,
    HighWind,
    ProlongedHighHumidity,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 6] = [
        RiskCategory::Drought,
        RiskCategory::FloodHeavyRain,
        RiskCategory::Heatwave,
        RiskCategory::Frost,
        RiskCategory::HighWind,
        RiskCategory::ProlongedHighHumidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Drought => "drought",
            RiskCategory::FloodHeavyRain => "flood_heavy_rain",
            RiskCategory::Heatwave => "heatwave",
            RiskCategory::Frost => "frost",
            RiskCategory::HighWind => "high_wind",
            RiskCategory::ProlongedHighHumidity => "prolonged_high_humidity",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triggered state and supporting evidence for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    pub warning: bool,
    pub details: Vec<String>,
}

/// Structured result of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub drought: CategoryAssessment,
    pub flood_heavy_rain: CategoryAssessment,
    pub heatwave: CategoryAssessment,
    pub frost: CategoryAssessment,
    pub high_wind: CategoryAssessment,
    pub prolonged_high_humidity: CategoryAssessment,
    /// Every alert in discovery order
    pub overall_alerts: Vec<String>,
}

impl RiskReport {
    pub fn category(&self, category: RiskCategory) -> &CategoryAssessment {
        match category {
            RiskCategory::Drought => &self.drought,
            RiskCategory::FloodHeavyRain => &self.flood_heavy_rain,
            RiskCategory::Heatwave => &self.heatwave,
            RiskCategory::Frost => &self.frost,
            RiskCategory::HighWind => &self.high_wind,
            RiskCategory::ProlongedHighHumidity => &self.prolonged_high_humidity,
        }
    }

    fn category_mut(&mut self, category: RiskCategory) -> &mut CategoryAssessment {
        match category {
            RiskCategory::Drought => &mut self.drought,
            RiskCategory::FloodHeavyRain => &mut self.flood_heavy_rain,
            RiskCategory::Heatwave => &mut self.heatwave,
            RiskCategory::Frost => &mut self.frost,
            RiskCategory::HighWind => &mut self.high_wind,
            RiskCategory::ProlongedHighHumidity => &mut self.prolonged_high_humidity,
        }
    }

    pub fn is_triggered(&self, category: RiskCategory) -> bool {
        self.category(category).warning
    }

    /// Categories with a warning, in reporting order
    pub fn triggered(&self) -> Vec<RiskCategory> {
        RiskCategory::ALL
            .into_iter()
            .filter(|c| self.is_triggered(*c))
            .collect()
    }

    pub fn has_any_warning(&self) -> bool {
        RiskCategory::ALL.iter().any(|c| self.is_triggered(*c))
    }

    fn raise(&mut self, category: RiskCategory, alert: String) {
        let entry = self.category_mut(category);
        entry.warning = true;
        entry.details.push(alert.clone());
        self.overall_alerts.push(alert);
    }
}

/// Per-evaluation state threaded through the day loop
struct Evaluation<'a> {
    thresholds: &'a ThresholdSet,
    report: RiskReport,
    consecutive_dry_days: u32,
    consecutive_hot_days: u32,
    heatwave_end_dates: BTreeSet<NaiveDate>,
}

impl<'a> Evaluation<'a> {
    fn new(thresholds: &'a ThresholdSet) -> Self {
        Self {
            thresholds,
            report: RiskReport::default(),
            consecutive_dry_days: 0,
            consecutive_hot_days: 0,
            heatwave_end_dates: BTreeSet::new(),
        }
    }

    fn check_day(&mut self, day: NaiveDate, summary: &DailySummary) {
        self.check_frost(day, summary);
        self.check_rain(day, summary);
        self.check_wind(day, summary);
        self.check_humidity(day, summary);
        self.check_drought(day, summary);
        self.check_heatwave(day, summary);
    }

    fn check_frost(&mut self, day: NaiveDate, summary: &DailySummary) {
        let threshold = self.thresholds.frost_risk_temp_c;
        if summary.min_temp <= threshold {
            self.report.raise(
                RiskCategory::Frost,
                format!(
                    "Frost Risk on {}: Min temp forecast {:.1}°C (Threshold: <= {}°C).",
                    day, summary.min_temp, threshold
                ),
            );
        }
    }

    fn check_rain(&mut self, day: NaiveDate, summary: &DailySummary) {
        let per_day = self.thresholds.flood_risk_mm_per_day;
        let per_interval = self.thresholds.heavy_rain_mm_per_3h;
        let max_interval = summary.max_interval_rain();

        if summary.total_rain >= per_day {
            self.report.raise(
                RiskCategory::FloodHeavyRain,
                format!(
                    "Flood Risk on {}: Total rain forecast {:.1}mm (Threshold: >= {}mm).",
                    day, summary.total_rain, per_day
                ),
            );
        } else if max_interval >= per_interval {
            self.report.raise(
                RiskCategory::FloodHeavyRain,
                format!(
                    "Heavy Rain Burst Risk on {}: Max 3h rain forecast {:.1}mm (Threshold: >= {}mm).",
                    day, max_interval, per_interval
                ),
            );
        }
    }

    fn check_wind(&mut self, day: NaiveDate, summary: &DailySummary) {
        let threshold = self.thresholds.high_wind_speed_ms;
        if summary.max_wind_speed >= threshold {
            self.report.raise(
                RiskCategory::HighWind,
                format!(
                    "High Wind Risk on {}: Max wind forecast {:.1} m/s (Threshold: >= {} m/s).",
                    day, summary.max_wind_speed, threshold
                ),
            );
        }
    }

    fn check_humidity(&mut self, day: NaiveDate, summary: &DailySummary) {
        let level = self.thresholds.high_humidity_perc;
        let duration = self.thresholds.high_humidity_duration_h;

        let readings: Vec<f64> = summary.humidity_readings.iter().flatten().copied().collect();
        let high: Vec<f64> = readings.iter().copied().filter(|h| *h >= level).collect();
        let hours = high.len() as u32 * SAMPLE_INTERVAL_HOURS;

        if !readings.is_empty() && f64::from(hours) >= duration {
            let avg_high = if high.is_empty() {
                level
            } else {
                high.iter().sum::<f64>() / high.len() as f64
            };
            self.report.raise(
                RiskCategory::ProlongedHighHumidity,
                format!(
                    "Prolonged High Humidity Risk on {}: Approx {} hours >= {}% (Avg high: {:.0}%, Threshold: >= {}h).",
                    day, hours, level, avg_high, duration
                ),
            );
        }
    }

    fn check_drought(&mut self, day: NaiveDate, summary: &DailySummary) {
        let dry_mm = self.thresholds.drought_risk_mm;
        let days = self.thresholds.drought_risk_days;

        if summary.total_rain <= dry_mm {
            self.consecutive_dry_days += 1;
        } else {
            self.consecutive_dry_days = 0;
        }

        if self.consecutive_dry_days >= days && !self.report.drought.warning {
            let start = day - Duration::days(i64::from(self.consecutive_dry_days) - 1);
            self.report.raise(
                RiskCategory::Drought,
                format!(
                    "Drought Risk Developing: {} consecutive days with <= {}mm rain starting around {}.",
                    self.consecutive_dry_days, dry_mm, start
                ),
            );
        }
    }

    fn check_heatwave(&mut self, day: NaiveDate, summary: &DailySummary) {
        let hot_c = self.thresholds.heatwave_temp_c;
        let days = self.thresholds.heatwave_days;

        if summary.max_temp >= hot_c {
            self.consecutive_hot_days += 1;
        } else {
            self.consecutive_hot_days = 0;
        }

        if self.consecutive_hot_days >= days && self.heatwave_end_dates.insert(day) {
            self.report.raise(
                RiskCategory::Heatwave,
                format!(
                    "Heatwave Risk: {} consecutive days >= {}°C (ending {}).",
                    self.consecutive_hot_days, hot_c, day
                ),
            );
        }
    }
}

/// Evaluate daily summaries from `today` onward.
///
/// At most [`FORECAST_HORIZON_DAYS`] days are considered.
pub fn evaluate(
    summaries: &BTreeMap<NaiveDate, DailySummary>,
    thresholds: &ThresholdSet,
    today: NaiveDate,
) -> RiskReport {
    info!(days = summaries.len(), today = %today, "Applying risk assessment rules");

    let mut evaluation = Evaluation::new(thresholds);

    for (processed, (day, summary)) in summaries.range(today..).enumerate() {
        if processed >= FORECAST_HORIZON_DAYS {
            debug!(horizon = FORECAST_HORIZON_DAYS, "Reached forecast limit for risk assessment");
            break;
        }
        evaluation.check_day(*day, summary);
    }

    let report = evaluation.report;
    let triggered: Vec<String> = report.triggered().iter().map(ToString::to_string).collect();
    info!(
        alerts = report.overall_alerts.len(),
        triggered = %triggered.join(","),
        "Climate risk assessment complete"
    );
    report
}

/// Assess a raw forecast document.
///
/// Missing, empty or wrongly shaped documents yield an all-clear report.
pub fn assess(
    document: &Value,
    thresholds: &ThresholdSet,
    offset: FixedOffset,
    today: NaiveDate,
) -> RiskReport {
    let entries = match document.get("list").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list,
        _ => {
            warn!("Forecast document is missing a non-empty 'list'; cannot assess risks");
            return RiskReport::default();
        }
    };

    let summaries = aggregate(entries, offset);
    evaluate(&summaries, thresholds, today)
}

/// Timezone of a forecast document (`city.timezone`, seconds east of UTC)
pub fn document_offset(document: &Value) -> Option<FixedOffset> {
    document
        .get("city")
        .and_then(|c| c.get("timezone"))
        .and_then(Value::as_i64)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
}

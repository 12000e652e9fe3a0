//! Farmer-facing advisory text
//!
//! Turns a risk report into ordered, human-readable lines. Callers decide how
//! to join or render them.

use tracing::{info, warn};

use crate::risk::{RiskCategory, RiskReport};
use crate::thresholds::{crops, stages};

/// Maximum forecast details echoed back under the details header
pub const MAX_DETAIL_LINES: usize = 7;

pub const MISSING_REPORT: &str =
    "❌ Could not generate advisories: Risk assessment data is missing.";
pub const NO_SIGNIFICANT_RISK: &str = "✅ No significant climate risks detected in the upcoming forecast based on current thresholds. Monitor crops as usual.";
pub const HEADER: &str = "--- Climate Risk Advisories & Recommendations ---";
pub const DETAILS_HEADER: &str = "--- Specific Forecast Details Triggering Warnings ---";
pub const TRUNCATION_MARKER: &str = "  - ... (and potentially more)";
pub const DISCLAIMER: &str = "NOTE: These advisories are based on forecast data and general rules. Always combine with your local knowledge, field observations, and consult local agricultural experts for critical decisions.";

/// Compose advisory lines for a report.
///
/// A missing report yields a single error line and an all-clear report a
/// single "no significant risk" line.
pub fn compose(report: Option<&RiskReport>, crop: &str, stage: &str) -> Vec<String> {
    info!(crop = %crop, stage = %stage, "Generating advisories");

    let Some(report) = report else {
        warn!("Advisory generation failed: no risk data");
        return vec![MISSING_REPORT.to_string()];
    };

    if !report.has_any_warning() {
        info!("Generated no-significant-risk advisory");
        return vec![NO_SIGNIFICANT_RISK.to_string()];
    }

    let mut lines = vec![HEADER.to_string()];

    for category in report.triggered() {
        lines.push(format!("\n⚠️ {}:", category_title(category)));
        lines.extend(category_advice(category, crop, stage));
    }

    if !report.overall_alerts.is_empty() {
        lines.push(format!("\n{}", DETAILS_HEADER));
        lines.extend(
            report
                .overall_alerts
                .iter()
                .take(MAX_DETAIL_LINES)
                .map(|detail| format!("  - {}", detail)),
        );
        if report.overall_alerts.len() > MAX_DETAIL_LINES {
            lines.push(TRUNCATION_MARKER.to_string());
        }
    }

    lines.push("\n---".to_string());
    lines.push(DISCLAIMER.to_string());

    info!(lines = lines.len(), "Generated advisory lines");
    lines
}

fn category_title(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Drought => "Drought / Dry Spell Risk",
        RiskCategory::FloodHeavyRain => "Flood / Heavy Rain Risk",
        RiskCategory::Heatwave => "Heatwave Risk",
        RiskCategory::Frost => "Frost Risk",
        RiskCategory::HighWind => "High Wind Risk",
        RiskCategory::ProlongedHighHumidity => "Prolonged High Humidity Risk",
    }
}

fn category_advice(category: RiskCategory, crop: &str, stage: &str) -> Vec<String> {
    let sensitive = stages::is_sensitive(stage);
    let mut advice: Vec<String> = Vec::new();
    let mut push = |line: &str| advice.push(format!("  - {}", line));

    match category {
        RiskCategory::Drought => {
            push("Focus on water conservation: check irrigation system efficiency, repair leaks.");
            push("Apply mulch to reduce evaporation from the soil surface.");
            if sensitive {
                push(&format!(
                    "CRITICAL STAGE ({}): Ensure adequate water if possible, as yield is highly sensitive now.",
                    stage
                ));
            } else {
                push("Consider adjusting irrigation schedule if water is limited.");
            }
        }
        RiskCategory::FloodHeavyRain => {
            push("Clear drainage channels and field outlets to prevent waterlogging.");
            push("Postpone fertilizer and pesticide application until after heavy rain passes.");
            if stage == stages::FRUITING_MATURITY {
                push("Consider harvesting mature produce early to avoid losses.");
            }
        }
        RiskCategory::Heatwave => {
            push("Irrigate during cooler hours (early morning or evening) to limit heat stress.");
            push("Provide shade for nurseries and sensitive plants where practical.");
            if sensitive {
                push(&format!(
                    "CRITICAL STAGE ({}): High temperatures can reduce pollination and fruit set.",
                    stage
                ));
            }
        }
        RiskCategory::Frost => {
            push("Irrigate lightly before frost nights; moist soil retains heat better.");
            push("Cover seedlings and low-growing crops overnight.");
            if crop == crops::VEGETABLES && stage == stages::GERMINATION_SEEDLING {
                push("Vegetable seedlings are highly vulnerable: delay transplanting until the cold spell passes.");
            }
        }
        RiskCategory::HighWind => {
            push("Stake or support tall crops and secure shade nets, trellises and structures.");
            push("Avoid spraying during windy periods to prevent drift.");
            if crop == crops::MAIZE && stage == stages::FRUITING_MATURITY {
                push("Mature maize is prone to lodging: inspect fields after strong winds.");
            }
        }
        RiskCategory::ProlongedHighHumidity => {
            push("Monitor closely for fungal diseases such as mildew and blight.");
            push("Improve air circulation by pruning or wider spacing where possible.");
            if sensitive {
                push("Flowers and developing fruit are prone to rot: consider a preventive fungicide as locally recommended.");
            }
        }
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::CategoryAssessment;

    fn triggered(details: &[&str]) -> CategoryAssessment {
        CategoryAssessment {
            warning: true,
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_report() {
        let lines = compose(None, "Rice", "Vegetative");
        assert_eq!(lines, vec![MISSING_REPORT.to_string()]);
    }

    #[test]
    fn test_all_clear_report() {
        let lines = compose(Some(&RiskReport::default()), "Rice", "Vegetative");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("No significant climate risks"));
    }

    #[test]
    fn test_sections_follow_category_order() {
        let report = RiskReport {
            frost: triggered(&["frost alert"]),
            drought: triggered(&["drought alert"]),
            overall_alerts: vec!["frost alert".into(), "drought alert".into()],
            ..RiskReport::default()
        };

        let lines = compose(Some(&report), "Other", "Vegetative");

        assert_eq!(lines[0], HEADER);
        let drought = lines.iter().position(|l| l.contains("Drought / Dry Spell Risk")).unwrap();
        let frost = lines.iter().position(|l| l.contains("Frost Risk")).unwrap();
        assert!(drought < frost);
        assert!(lines.contains(&"  - Consider adjusting irrigation schedule if water is limited.".to_string()));
        assert!(lines.contains(&"  - frost alert".to_string()));
        assert_eq!(lines.last().unwrap(), DISCLAIMER);
    }

    #[test]
    fn test_drought_advice_at_critical_stage() {
        let report = RiskReport {
            drought: triggered(&["d"]),
            overall_alerts: vec!["d".into()],
            ..RiskReport::default()
        };

        let lines = compose(Some(&report), "Maize", "Flowering");
        assert!(lines.iter().any(|l| l.contains("CRITICAL STAGE (Flowering)")));
        assert!(!lines.iter().any(|l| l.contains("Consider adjusting irrigation")));
    }

    #[test]
    fn test_details_truncated_at_seven() {
        let alerts: Vec<String> = (1..=9).map(|i| format!("alert {}", i)).collect();
        let report = RiskReport {
            high_wind: triggered(&[]),
            overall_alerts: alerts,
            ..RiskReport::default()
        };

        let lines = compose(Some(&report), "Other", "Vegetative");
        let details: Vec<&String> = lines.iter().filter(|l| l.starts_with("  - alert")).collect();

        assert_eq!(details.len(), MAX_DETAIL_LINES);
        assert_eq!(details.last().unwrap().as_str(), "  - alert 7");
        let marker = lines.iter().position(|l| l == TRUNCATION_MARKER).unwrap();
        assert_eq!(lines[marker - 1], "  - alert 7");
        assert!(lines[marker].contains("and potentially more"));
    }

    #[test]
    fn test_exactly_seven_details_has_no_marker() {
        let alerts: Vec<String> = (1..=7).map(|i| format!("alert {}", i)).collect();
        let report = RiskReport {
            heatwave: triggered(&[]),
            overall_alerts: alerts,
            ..RiskReport::default()
        };

        let lines = compose(Some(&report), "Other", "Vegetative");
        assert!(!lines.iter().any(|l| l == TRUNCATION_MARKER));
    }
}

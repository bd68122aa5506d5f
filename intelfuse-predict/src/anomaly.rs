// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

use crate::timeline::{build_timeline, mean, sample_stdev};
use chrono::NaiveDate;
use intelfuse_types::{EventRecord, Severity, round_to};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum events before daily statistics mean anything.
const MIN_EVENTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spike,
    Drop,
}

/// One day whose event count sits outside the expected band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub event_count: usize,
    pub expected_low: f64,
    pub expected_high: f64,
    pub z_score: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub description: String,
}

/// Flag days whose event counts deviate more than `threshold_std` standard
/// deviations from the daily mean.
///
/// Requires at least ten events. A zero standard deviation (identical daily
/// counts) resolves every z-score to 0 rather than dividing by zero, so a
/// perfectly flat series reports nothing. Output sorted by |z| descending.
pub fn detect_anomalies(events: &[EventRecord], threshold_std: f64) -> Vec<Anomaly> {
    if events.len() < MIN_EVENTS {
        return Vec::new();
    }

    let timeline = build_timeline(events, |e| e.timestamp);
    let values: Vec<f64> = timeline.values().map(|&v| v as f64).collect();
    let m = mean(&values);
    let sd = sample_stdev(&values);

    let mut anomalies: Vec<Anomaly> = timeline
        .iter()
        .filter_map(|(&date, &count)| {
            let z = if sd > 0.0 { (count as f64 - m) / sd } else { 0.0 };
            if z.abs() <= threshold_std {
                return None;
            }

            let severity = if z.abs() > 3.0 {
                Severity::Critical
            } else if z.abs() > 2.5 {
                Severity::High
            } else {
                Severity::Medium
            };
            let kind = if z > 0.0 { AnomalyKind::Spike } else { AnomalyKind::Drop };

            Some(Anomaly {
                date,
                event_count: count,
                expected_low: round_to(m - threshold_std * sd, 2),
                expected_high: round_to(m + threshold_std * sd, 2),
                z_score: round_to(z, 2),
                severity,
                kind,
                description: format!(
                    "{} of {:.0} events ({:.1} sigma from normal)",
                    if z > 0.0 { "Spike" } else { "Drop" },
                    (count as f64 - m).abs(),
                    z.abs()
                ),
            })
        })
        .collect();

    anomalies.sort_by(|a, b| b.z_score.abs().total_cmp(&a.z_score.abs()));
    info!(events = events.len(), anomalies = anomalies.len(), "anomaly detection");
    anomalies
}

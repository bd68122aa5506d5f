// ---------------------------------------------------------------------------
// Vulnerability discovery trends
// ---------------------------------------------------------------------------

use crate::timeline::{build_timeline, mean, sample_stdev};
use chrono::{DateTime, Utc};
use intelfuse_types::{ConfidenceLabel, EventRecord, round_to};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Direction of the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Human-scale description of the day-over-day velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityBand {
    RapidlyIncreasing,
    Increasing,
    Stable,
    Decreasing,
    RapidlyDecreasing,
}

impl VelocityBand {
    fn from_velocity(velocity: f64) -> Self {
        if velocity > 5.0 {
            Self::RapidlyIncreasing
        } else if velocity > 2.0 {
            Self::Increasing
        } else if velocity > -2.0 {
            Self::Stable
        } else if velocity > -5.0 {
            Self::Decreasing
        } else {
            Self::RapidlyDecreasing
        }
    }
}

impl fmt::Display for VelocityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RapidlyIncreasing => write!(f, "rapidly_increasing"),
            Self::Increasing => write!(f, "increasing"),
            Self::Stable => write!(f, "stable"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::RapidlyDecreasing => write!(f, "rapidly_decreasing"),
        }
    }
}

/// One projected day of the flat-velocity forecast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub day: u32,
    pub predicted_count: f64,
}

/// Trend analysis over a discovery timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub trend: Trend,
    /// Mean day-over-day delta of the observed counts.
    pub velocity: f64,
    pub velocity_description: VelocityBand,
    pub forecast: Vec<ForecastPoint>,
    pub patterns: Vec<String>,
    /// Scales with how many distinct days were observed.
    pub confidence: ConfidenceLabel,
    pub analyzed_at: DateTime<Utc>,
}

/// Analyze discovery trends over historical events and project ahead.
///
/// The trend compares the mean of the first half of the timeline to the mean
/// of the second half (a 20% move either way counts); the forecast projects
/// the observed mean forward at constant velocity. Fewer than three observed
/// days is not enough signal for either.
pub fn vulnerability_trends(
    events: &[EventRecord],
    days_ahead: u32,
    now: DateTime<Utc>,
) -> TrendReport {
    info!(events = events.len(), days_ahead, "analyzing vulnerability trends");

    let timeline = build_timeline(events, |e| e.timestamp);
    let values: Vec<f64> = timeline.values().map(|&v| v as f64).collect();

    let velocity = day_over_day_velocity(&values);

    TrendReport {
        trend: trend_direction(&values),
        velocity: round_to(velocity, 2),
        velocity_description: VelocityBand::from_velocity(velocity),
        forecast: forecast(&values, velocity, days_ahead),
        patterns: spike_patterns(&values),
        confidence: confidence_for_days(timeline.len()),
        analyzed_at: now,
    }
}

fn trend_direction(values: &[f64]) -> Trend {
    if values.len() < 3 {
        return Trend::InsufficientData;
    }
    let mid = values.len() / 2;
    let first = mean(&values[..mid]);
    let second = mean(&values[mid..]);

    if second > first * 1.2 {
        Trend::Increasing
    } else if second < first * 0.8 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn day_over_day_velocity(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    mean(&deltas)
}

fn forecast(values: &[f64], velocity: f64, days_ahead: u32) -> Vec<ForecastPoint> {
    if values.len() < 3 {
        return Vec::new();
    }
    let avg = mean(values);
    (1..=days_ahead)
        .map(|day| ForecastPoint {
            day,
            predicted_count: round_to((avg + velocity * day as f64).max(0.0), 1),
        })
        .collect()
}

/// Report count spikes above two standard deviations. Needs a week of signal
/// before saying anything.
fn spike_patterns(values: &[f64]) -> Vec<String> {
    if values.len() < 7 {
        return Vec::new();
    }
    let m = mean(values);
    let sd = sample_stdev(values);
    let spikes = values.iter().filter(|&&v| v > m + 2.0 * sd).count();
    if spikes > 0 {
        vec![format!("Detected {spikes} spike(s) above normal")]
    } else {
        Vec::new()
    }
}

fn confidence_for_days(observed_days: usize) -> ConfidenceLabel {
    if observed_days < 7 {
        ConfidenceLabel::Low
    } else if observed_days < 30 {
        ConfidenceLabel::Moderate
    } else {
        ConfidenceLabel::High
    }
}

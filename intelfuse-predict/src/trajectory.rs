// ---------------------------------------------------------------------------
// Risk trajectory forecasting
// ---------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};
use intelfuse_types::{ConfidenceLabel, Severity, round_to};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum history before a regression means anything.
pub const MIN_HISTORY_POINTS: usize = 5;

/// One observed point of an asset's (or the organization's) risk history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskPoint {
    pub timestamp: DateTime<Utc>,
    pub risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Increasing,
    Decreasing,
    Stable,
}

/// One projected day of the risk forecast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskForecastPoint {
    pub day: u32,
    pub date: DateTime<Utc>,
    pub predicted_risk: f64,
}

/// Risk trajectory forecast over the coming days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryReport {
    pub current_risk: f64,
    pub trajectory: Trajectory,
    pub severity: Severity,
    /// OLS slope of the historical series, risk units per observation.
    pub slope: f64,
    pub forecast: Vec<RiskForecastPoint>,
    pub peak_risk: f64,
    pub recommendation: String,
    pub confidence: ConfidenceLabel,
    pub forecasted_at: DateTime<Utc>,
}

/// Forecast outcome: a structured insufficient-data marker below the minimum
/// history, a report otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrajectoryForecast {
    InsufficientData { required: usize, provided: usize },
    Forecast(Box<TrajectoryReport>),
}

impl TrajectoryForecast {
    pub fn report(&self) -> Option<&TrajectoryReport> {
        match self {
            Self::Forecast(report) => Some(report),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Forecast how risk will evolve, projecting the historical trend forward
/// from the current level.
///
/// Ordinary least squares over observation index vs value gives the slope; a
/// degenerate series (too short after the minimum check, or zero variance in
/// x) resolves to slope 0 rather than failing. Each projected day is clamped
/// to the 0-10 risk scale.
pub fn forecast_risk_trajectory(
    current_risk: f64,
    historical_risks: &[RiskPoint],
    days_ahead: u32,
    now: DateTime<Utc>,
) -> TrajectoryForecast {
    if historical_risks.len() < MIN_HISTORY_POINTS {
        info!(
            provided = historical_risks.len(),
            required = MIN_HISTORY_POINTS,
            "insufficient history for trajectory forecast"
        );
        return TrajectoryForecast::InsufficientData {
            required: MIN_HISTORY_POINTS,
            provided: historical_risks.len(),
        };
    }

    let values: Vec<f64> = historical_risks.iter().map(|p| p.risk).collect();
    let slope = ols_slope(&values);

    let forecast: Vec<RiskForecastPoint> = (1..=days_ahead)
        .map(|day| RiskForecastPoint {
            day,
            date: now + Duration::days(day as i64),
            predicted_risk: round_to((current_risk + slope * day as f64).clamp(0.0, 10.0), 2),
        })
        .collect();

    let (trajectory, severity) = classify(slope);
    let peak_risk = forecast
        .iter()
        .map(|p| p.predicted_risk)
        .fold(round_to(current_risk.clamp(0.0, 10.0), 2), f64::max);

    TrajectoryForecast::Forecast(Box::new(TrajectoryReport {
        current_risk: round_to(current_risk, 2),
        trajectory,
        severity,
        slope: round_to(slope, 4),
        forecast,
        peak_risk,
        recommendation: recommendation(trajectory, slope),
        confidence: ConfidenceLabel::Moderate,
        forecasted_at: now,
    }))
}

/// Least-squares slope over index vs value. Zero denominator resolves to 0.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator != 0.0 { numerator / denominator } else { 0.0 }
}

/// Trajectory bands on the slope, with severity sub-bands by magnitude.
fn classify(slope: f64) -> (Trajectory, Severity) {
    if slope > 0.05 {
        let severity = if slope > 0.2 {
            Severity::Critical
        } else if slope > 0.1 {
            Severity::High
        } else {
            Severity::Medium
        };
        (Trajectory::Increasing, severity)
    } else if slope < -0.05 {
        (Trajectory::Decreasing, Severity::Low)
    } else {
        (Trajectory::Stable, Severity::Medium)
    }
}

fn recommendation(trajectory: Trajectory, slope: f64) -> String {
    match trajectory {
        Trajectory::Increasing if slope > 0.2 => {
            "URGENT: Risk rapidly increasing - immediate intervention required".to_string()
        }
        Trajectory::Increasing => "Risk trending upward - review security posture".to_string(),
        Trajectory::Decreasing => "Risk decreasing - current controls effective".to_string(),
        Trajectory::Stable => "Risk stable - maintain current security measures".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(risks: &[f64]) -> Vec<RiskPoint> {
        let base = Utc::now() - Duration::days(risks.len() as i64);
        risks
            .iter()
            .enumerate()
            .map(|(i, &risk)| RiskPoint { timestamp: base + Duration::days(i as i64), risk })
            .collect()
    }

    #[test]
    fn four_points_are_insufficient() {
        let out = forecast_risk_trajectory(5.0, &history(&[4.0, 4.5, 5.0, 5.5]), 30, Utc::now());
        match out {
            TrajectoryForecast::InsufficientData { required, provided } => {
                assert_eq!(required, 5);
                assert_eq!(provided, 4);
            }
            TrajectoryForecast::Forecast(_) => panic!("four points must be insufficient"),
        }
    }

    #[test]
    fn rising_history_forecasts_increasing() {
        let out =
            forecast_risk_trajectory(6.0, &history(&[4.0, 4.5, 5.0, 5.5, 6.0]), 10, Utc::now());
        let r = out.report().expect("forecast");
        assert_eq!(r.trajectory, Trajectory::Increasing);
        // Slope of a clean 0.5-per-step ramp
        assert!((r.slope - 0.5).abs() < 1e-9);
        assert_eq!(r.severity, Severity::Critical);
        assert_eq!(r.forecast.len(), 10);
        assert!(r.forecast[9].predicted_risk > r.forecast[0].predicted_risk);
        assert!(r.recommendation.starts_with("URGENT"));
    }

    #[test]
    fn forecast_clamps_to_risk_scale() {
        let out =
            forecast_risk_trajectory(9.0, &history(&[5.0, 6.0, 7.0, 8.0, 9.0]), 30, Utc::now());
        let r = out.report().unwrap();
        assert!(r.forecast.iter().all(|p| (0.0..=10.0).contains(&p.predicted_risk)));
        assert_eq!(r.peak_risk, 10.0);

        let out =
            forecast_risk_trajectory(1.0, &history(&[9.0, 7.0, 5.0, 3.0, 1.0]), 30, Utc::now());
        let r = out.report().unwrap();
        assert!(r.forecast.iter().all(|p| p.predicted_risk >= 0.0));
        assert_eq!(r.trajectory, Trajectory::Decreasing);
        assert_eq!(r.severity, Severity::Low);
    }

    #[test]
    fn flat_history_is_stable() {
        let out =
            forecast_risk_trajectory(5.0, &history(&[5.0, 5.0, 5.0, 5.0, 5.0]), 7, Utc::now());
        let r = out.report().unwrap();
        assert_eq!(r.slope, 0.0);
        assert_eq!(r.trajectory, Trajectory::Stable);
        assert_eq!(r.severity, Severity::Medium);
        assert!(r.forecast.iter().all(|p| p.predicted_risk == 5.0));
    }

    #[test]
    fn zero_days_ahead_still_reports_peak() {
        let out =
            forecast_risk_trajectory(5.0, &history(&[5.0, 5.0, 5.0, 5.0, 5.0]), 0, Utc::now());
        let r = out.report().unwrap();
        assert!(r.forecast.is_empty());
        assert_eq!(r.peak_risk, 5.0);
    }

    #[test]
    fn insufficient_data_serializes_with_status_tag() {
        let out = forecast_risk_trajectory(5.0, &[], 30, Utc::now());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["status"], "insufficient_data");
    }
}

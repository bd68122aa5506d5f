pub mod anomaly;
pub mod emerging;
pub mod likelihood;
pub mod timeline;
pub mod trajectory;
pub mod trends;

pub use anomaly::{Anomaly, AnomalyKind, detect_anomalies};
pub use emerging::{EmergingStatus, EmergingThreat, ThreatKind, identify_emerging_threats};
pub use likelihood::{
    AttackLikelihood, LikelihoodFactors, LikelihoodLabel, Timeframe, predict_attack_likelihood,
};
pub use timeline::build_timeline;
pub use trajectory::{
    MIN_HISTORY_POINTS, RiskForecastPoint, RiskPoint, Trajectory, TrajectoryForecast,
    TrajectoryReport, forecast_risk_trajectory,
};
pub use trends::{ForecastPoint, Trend, TrendReport, VelocityBand, vulnerability_trends};

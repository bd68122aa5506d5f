pub mod campaigns;
pub mod indicators;
pub mod spatial;
pub mod temporal;
pub mod vulns;

pub use campaigns::{Campaign, identify_campaigns};
pub use indicators::{IndicatorCluster, correlate_indicators};
pub use spatial::{SpatialCluster, spatial_correlation};
pub use temporal::{DEFAULT_WINDOW_HOURS, TemporalCluster, temporal_correlation};
pub use vulns::{VulnThreatCorrelation, correlate_vulnerabilities_with_threats};

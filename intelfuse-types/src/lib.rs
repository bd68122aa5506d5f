pub mod asset;
pub mod event;
pub mod intel;
pub mod path;
pub mod score;
pub mod vuln;

pub use asset::{
    AssetSnapshot, AssetStatus, AssetType, Capability, Criticality, Exposure, capabilities_from_tags,
};
pub use event::{AttackEvent, EventRecord, GeoRecord};
pub use intel::{Indicator, IocType, SourceRef, SourceType, ThreatContext, ThreatRecord};
pub use path::{AttackPath, PathNode};
pub use score::{ConfidenceLabel, Severity, round_to};
pub use vuln::{ExploitStatus, Vulnerability};

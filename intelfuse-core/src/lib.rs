pub mod engine;
pub mod providers;

pub use engine::{BatchConfig, EngineError, FusionEngine, FusionEvent};
pub use providers::{
    EnrichmentProvider, GraphProvider, ProviderError, ThreatContextProvider, VulnEnrichment,
    apply_enrichment,
};
pub use tokio_util::sync::CancellationToken;

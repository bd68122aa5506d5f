// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------
//
// The engine never does its own I/O. Everything it analyzes arrives through
// these traits: the graph store resolves entities and walks attack paths, the
// threat-context service flags exploitation, the enrichment service expands
// vulnerability ids. Failures surface as ProviderError and are never retried
// here; retry policy belongs to the implementations.

use async_trait::async_trait;
use intelfuse_types::{AssetSnapshot, AttackPath, ExploitStatus, ThreatContext, Vulnerability};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("collaborator unreachable: {0}")]
    Unreachable(String),
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
    #[error("unknown entity: {0}")]
    NotFound(String),
}

/// Read access to the externally owned knowledge graph.
///
/// Path traversal happens on the collaborator's side up to the requested
/// depth; the engine only analyzes the ordered node sequences it gets back.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// All monitored asset snapshots in scope for this assessment.
    async fn assets(&self) -> Result<Vec<AssetSnapshot>, ProviderError>;

    /// Vulnerabilities the graph currently links to an asset.
    async fn vulnerabilities_for(
        &self,
        asset_id: &str,
    ) -> Result<Vec<Vulnerability>, ProviderError>;

    /// Resolved attack paths ending at the given asset.
    async fn attack_paths(
        &self,
        target_asset_id: &str,
        max_depth: usize,
    ) -> Result<Vec<AttackPath>, ProviderError>;
}

/// Per-vulnerability exploitation flags from the threat-intel service.
#[async_trait]
pub trait ThreatContextProvider: Send + Sync {
    /// `None` means no intelligence, which scores neutrally.
    async fn context_for(
        &self,
        vulnerability_id: &str,
    ) -> Result<Option<ThreatContext>, ProviderError>;
}

/// Extended vulnerability metadata resolved by the enrichment collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnEnrichment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploit_status: Option<ExploitStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_available: Option<bool>,
}

/// Vulnerability id to extended metadata. Batchable; rate limiting is the
/// implementation's concern.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn enrich(
        &self,
        vulnerability_id: &str,
    ) -> Result<Option<VulnEnrichment>, ProviderError>;
}

/// Fold enrichment data into a vulnerability snapshot. Only fields the
/// enrichment actually carries overwrite the snapshot.
pub fn apply_enrichment(vulnerability: &mut Vulnerability, enrichment: &VulnEnrichment) {
    if let Some(status) = enrichment.exploit_status {
        vulnerability.exploit_status = status;
    }
    if let Some(patch) = enrichment.patch_available {
        vulnerability.patch_available = patch;
    }
}

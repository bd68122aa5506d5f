// ---------------------------------------------------------------------------
// Fusion engine: bounded fan-out over assets, fan-in to organization posture
// ---------------------------------------------------------------------------
//
// The analytic functions are pure and synchronous; this engine is the only
// async piece. It fans per-asset profiling out under a semaphore, applies the
// per-item timeout, drops failed or slow items from aggregation (with an
// event, never silently), and only aggregates once the full result set is in.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use intelfuse_paths::{ChokePoint, RankedPath, analyze_path, identify_critical_nodes, rank_attack_paths};
use intelfuse_risk::{AssetRiskProfile, OrganizationRisk, asset_risk_profile, organization_risk};
use intelfuse_types::{AssetSnapshot, Vulnerability};
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::providers::{
    EnrichmentProvider, GraphProvider, ProviderError, ThreatContextProvider, apply_enrichment,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no assets to assess")]
    NoAssets,
    #[error("collaborator failure: {0}")]
    Provider(#[from] ProviderError),
    #[error("task join error: {0}")]
    TaskJoinError(String),
}

/// Tuning for batch fan-out.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Concurrent in-flight items.
    pub max_concurrency: usize,
    /// Budget per item; items over budget are dropped from aggregation.
    pub item_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrency: 32, item_timeout: Duration::from_secs(30) }
    }
}

/// Event emitted during a streaming assessment.
#[derive(Debug, Clone)]
pub enum FusionEvent {
    /// One asset's profile completed.
    AssetProfiled {
        index: usize,
        profile: Box<AssetRiskProfile>,
        completed: usize,
        total: usize,
    },
    /// One asset was dropped from aggregation (collaborator failure/timeout).
    AssetSkipped { asset_id: String, reason: String },
    /// Full assessment completed.
    Complete(Box<OrganizationRisk>),
    /// Informational progress message.
    Log(String),
}

pub struct FusionEngine;

impl FusionEngine {
    /// Assess the whole organization.
    ///
    /// Thin wrapper around [`run_streaming`](Self::run_streaming) that
    /// collects events internally and returns the final posture.
    pub async fn assess_organization(
        graph: Arc<dyn GraphProvider>,
        contexts: Arc<dyn ThreatContextProvider>,
        config: &BatchConfig,
    ) -> Result<OrganizationRisk, EngineError> {
        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let config = config.clone();

        let handle = tokio::spawn(async move {
            Self::run_streaming(graph, contexts, &config, tx, cancel).await
        });

        let mut final_result = None;
        while let Some(event) = rx.recv().await {
            if let FusionEvent::Complete(result) = event {
                final_result = Some(*result);
            }
        }

        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(EngineError::TaskJoinError(e.to_string())),
        }

        final_result.ok_or(EngineError::NoAssets)
    }

    /// Streaming assessment, emitting [`FusionEvent`]s as assets complete.
    ///
    /// Events are sent best-effort so a dropped receiver cannot stall the
    /// batch. The final [`FusionEvent::Complete`] is always last on success;
    /// on cancellation, already finished profiles are still aggregated.
    pub async fn run_streaming(
        graph: Arc<dyn GraphProvider>,
        contexts: Arc<dyn ThreatContextProvider>,
        config: &BatchConfig,
        tx: mpsc::Sender<FusionEvent>,
        cancel: CancellationToken,
    ) -> Result<(), EngineError> {
        let assets = graph.assets().await?;
        if assets.is_empty() {
            return Err(EngineError::NoAssets);
        }

        let total = assets.len();
        let now = Utc::now();
        let _ = tx
            .send(FusionEvent::Log(format!("Assessing {total} assets...")))
            .await;
        info!(assets = total, concurrency = config.max_concurrency, "starting batch assessment");

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let mut join_set: JoinSet<(usize, String, Result<AssetRiskProfile, String>)> =
            JoinSet::new();

        for (index, asset) in assets.into_iter().enumerate() {
            let graph = graph.clone();
            let contexts = contexts.clone();
            let semaphore = semaphore.clone();
            let timeout = config.item_timeout;

            join_set.spawn(async move {
                let asset_id = asset.id.clone();
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => return (index, asset_id, Err(format!("semaphore closed: {e}"))),
                };

                let work = profile_asset(&*graph, &*contexts, &asset, now);
                let outcome = match tokio::time::timeout(timeout, work).await {
                    Ok(Ok(profile)) => Ok(profile),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err("item timeout".to_string()),
                };
                (index, asset_id, outcome)
            });
        }

        let mut profiles: Vec<(usize, AssetRiskProfile)> = Vec::with_capacity(total);
        let mut completed = 0usize;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    // Keep whatever finished before the abort
                    while let Some(result) = join_set.join_next().await {
                        if let Ok((index, _, Ok(profile))) = result {
                            profiles.push((index, profile));
                        }
                    }
                    let _ = tx.send(FusionEvent::Log("assessment cancelled".into())).await;
                    break;
                }
                result = join_set.join_next() => {
                    match result {
                        Some(Ok((index, _, Ok(profile)))) => {
                            completed += 1;
                            let _ = tx.send(FusionEvent::AssetProfiled {
                                index,
                                profile: Box::new(profile.clone()),
                                completed,
                                total,
                            }).await;
                            profiles.push((index, profile));
                        }
                        Some(Ok((index, asset_id, Err(reason)))) => {
                            completed += 1;
                            warn!(index, asset = %asset_id, %reason, "asset excluded from aggregation");
                            let _ = tx.send(FusionEvent::AssetSkipped { asset_id, reason }).await;
                        }
                        Some(Err(e)) => {
                            completed += 1;
                            warn!(error = %e, "assessment task panicked");
                            let _ = tx.send(FusionEvent::Log(format!("task failure: {e}"))).await;
                        }
                        None => break,
                    }
                }
            }
        }

        // Fan-in is complete (or cancelled); aggregation runs over the full
        // surviving result set.
        profiles.sort_by_key(|(index, _)| *index);
        let profiles: Vec<AssetRiskProfile> = profiles.into_iter().map(|(_, p)| p).collect();
        let posture = organization_risk(&profiles, now);
        let _ = tx.send(FusionEvent::Complete(Box::new(posture))).await;

        Ok(())
    }

    /// Rank every resolved attack path against a target and locate
    /// chokepoints.
    ///
    /// Traversal already happened on the graph side; analysis is pure, so the
    /// only await is the fetch. Invalid paths (under two nodes) are skipped
    /// with a warning rather than poisoning the ranking.
    pub async fn assess_attack_surface(
        graph: &dyn GraphProvider,
        target_asset_id: &str,
        max_depth: usize,
    ) -> Result<(Vec<RankedPath>, Vec<ChokePoint>), EngineError> {
        let paths = graph.attack_paths(target_asset_id, max_depth).await?;
        let now = Utc::now();

        let mut reports = Vec::with_capacity(paths.len());
        for path in &paths {
            match analyze_path(&path.nodes, &path.vulnerabilities, now).report() {
                Some(report) => reports.push(report.clone()),
                None => {
                    warn!(target = target_asset_id, "skipping invalid attack path");
                }
            }
        }

        let chokepoints = identify_critical_nodes(&reports);
        let ranked = rank_attack_paths(reports);
        info!(
            target = target_asset_id,
            paths = ranked.len(),
            chokepoints = chokepoints.len(),
            "attack surface assessed"
        );
        Ok((ranked, chokepoints))
    }

    /// Enrich a batch of vulnerabilities under the concurrency cap.
    ///
    /// Enrichment is additive: an item whose lookup fails or times out keeps
    /// its original snapshot and the batch continues.
    pub async fn enrich_vulnerabilities(
        enrichment: Arc<dyn EnrichmentProvider>,
        vulnerabilities: Vec<Vulnerability>,
        config: &BatchConfig,
    ) -> Result<Vec<Vulnerability>, EngineError> {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let mut join_set: JoinSet<(usize, Vulnerability)> = JoinSet::new();

        let total = vulnerabilities.len();
        for (index, mut vuln) in vulnerabilities.into_iter().enumerate() {
            let enrichment = enrichment.clone();
            let semaphore = semaphore.clone();
            let timeout = config.item_timeout;

            join_set.spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, vuln),
                };
                let outcome = tokio::time::timeout(timeout, enrichment.enrich(&vuln.id)).await;
                match outcome {
                    Ok(Ok(Some(data))) => apply_enrichment(&mut vuln, &data),
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => warn!(vuln = %vuln.id, error = %e, "enrichment failed"),
                    Err(_) => warn!(vuln = %vuln.id, "enrichment timeout"),
                }
                (index, vuln)
            });
        }

        let mut enriched: Vec<(usize, Vulnerability)> = Vec::with_capacity(total);
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(item) => enriched.push(item),
                Err(e) => return Err(EngineError::TaskJoinError(e.to_string())),
            }
        }
        enriched.sort_by_key(|(index, _)| *index);
        Ok(enriched.into_iter().map(|(_, v)| v).collect())
    }
}

/// Resolve one asset's vulnerabilities and contexts, then score. Provider
/// errors propagate so the batch layer can exclude the item.
async fn profile_asset(
    graph: &dyn GraphProvider,
    contexts: &dyn ThreatContextProvider,
    asset: &AssetSnapshot,
    now: chrono::DateTime<Utc>,
) -> Result<AssetRiskProfile, ProviderError> {
    let vulnerabilities = graph.vulnerabilities_for(&asset.id).await?;

    let mut threat_contexts = Vec::with_capacity(vulnerabilities.len());
    for vuln in &vulnerabilities {
        threat_contexts.push(contexts.context_for(&vuln.id).await?);
    }

    Ok(asset_risk_profile(asset, &vulnerabilities, &threat_contexts, now))
}

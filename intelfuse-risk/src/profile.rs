// ---------------------------------------------------------------------------
// Risk aggregation: asset profiles and organization posture
// ---------------------------------------------------------------------------

use crate::scoring::{Priority, RiskAssessment, risk_score};
use chrono::{DateTime, Utc};
use intelfuse_types::{AssetSnapshot, Severity, ThreatContext, Vulnerability, round_to};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How many per-vulnerability assessments an asset profile carries verbatim.
const TOP_RISKS: usize = 5;

/// How many assets the organization posture lists individually.
const TOP_ASSETS: usize = 10;

/// Aggregated risk picture for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRiskProfile {
    pub asset_id: String,
    pub asset_value: String,
    /// Top-weighted overall risk, 0.0-10.0.
    pub overall_risk: f64,
    pub severity: Severity,
    pub vulnerability_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    /// Highest-scoring assessments, descending.
    pub top_risks: Vec<RiskAssessment>,
    pub urgent_actions_required: bool,
    pub calculated_at: DateTime<Utc>,
}

/// Severity distribution over a set of asset profiles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// One line of the organization's top-risk table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRiskSummary {
    pub asset_id: String,
    pub asset_value: String,
    pub risk_score: f64,
    pub vulnerability_count: usize,
}

/// Organization-wide risk posture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationRisk {
    pub overall_risk: f64,
    pub severity: Severity,
    pub total_assets: usize,
    pub total_vulnerabilities: usize,
    pub risk_distribution: RiskDistribution,
    pub critical_assets: usize,
    pub high_risk_assets: usize,
    pub top_risky_assets: Vec<AssetRiskSummary>,
    pub urgent_actions_required: bool,
    pub calculated_at: DateTime<Utc>,
}

/// Build the risk profile for one asset across all of its vulnerabilities.
///
/// `contexts` is index-aligned with `vulnerabilities`; a short or absent list
/// means no intelligence for the remaining findings. The overall risk is a
/// top-weighted blend (0.5/0.3/0.2 over the worst three findings) rather than
/// a plain average, so one critical finding is never diluted by a long tail
/// of noise.
pub fn asset_risk_profile(
    asset: &AssetSnapshot,
    vulnerabilities: &[Vulnerability],
    contexts: &[Option<ThreatContext>],
    now: DateTime<Utc>,
) -> AssetRiskProfile {
    let mut assessments: Vec<RiskAssessment> = vulnerabilities
        .iter()
        .enumerate()
        .map(|(idx, vuln)| {
            let ctx = contexts.get(idx).copied().flatten();
            risk_score(asset, vuln, ctx.as_ref(), now)
        })
        .collect();

    let mut critical_count = 0;
    let mut high_count = 0;
    let mut medium_count = 0;
    let mut low_count = 0;
    for a in &assessments {
        match a.severity {
            Severity::Critical => critical_count += 1,
            Severity::High => high_count += 1,
            Severity::Medium => medium_count += 1,
            Severity::Low => low_count += 1,
        }
    }

    assessments.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    let overall = top_weighted_risk(&assessments);
    let urgent =
        critical_count > 0 || assessments.iter().any(|a| a.priority == Priority::Urgent);

    assessments.truncate(TOP_RISKS);

    AssetRiskProfile {
        asset_id: asset.id.clone(),
        asset_value: asset.value.clone(),
        overall_risk: round_to(overall, 2),
        severity: Severity::from_score(overall),
        vulnerability_count: vulnerabilities.len(),
        critical_count,
        high_count,
        medium_count,
        low_count,
        top_risks: assessments,
        urgent_actions_required: urgent,
        calculated_at: now,
    }
}

/// Top-weighted blend over descending-sorted assessments: 0.5/0.3/0.2 for
/// three or more findings, 0.6/0.4 for two, the score itself for one.
fn top_weighted_risk(sorted: &[RiskAssessment]) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => only.risk_score,
        [first, second] => first.risk_score * 0.6 + second.risk_score * 0.4,
        [first, second, third, ..] => {
            first.risk_score * 0.5 + second.risk_score * 0.3 + third.risk_score * 0.2
        }
    }
}

/// Roll asset profiles up into the organization-wide posture.
pub fn organization_risk(profiles: &[AssetRiskProfile], now: DateTime<Utc>) -> OrganizationRisk {
    info!(assets = profiles.len(), "aggregating organization risk");

    let total_vulnerabilities = profiles.iter().map(|p| p.vulnerability_count).sum();

    let mut distribution = RiskDistribution::default();
    for p in profiles {
        match p.severity {
            Severity::Critical => distribution.critical += 1,
            Severity::High => distribution.high += 1,
            Severity::Medium => distribution.medium += 1,
            Severity::Low => distribution.low += 1,
        }
    }

    let overall = if profiles.is_empty() {
        0.0
    } else {
        profiles.iter().map(|p| p.overall_risk).sum::<f64>() / profiles.len() as f64
    };

    let mut ranked: Vec<&AssetRiskProfile> = profiles.iter().collect();
    ranked.sort_by(|a, b| b.overall_risk.total_cmp(&a.overall_risk));

    OrganizationRisk {
        overall_risk: round_to(overall, 2),
        severity: Severity::from_score(overall),
        total_assets: profiles.len(),
        total_vulnerabilities,
        risk_distribution: distribution,
        critical_assets: distribution.critical,
        high_risk_assets: distribution.high,
        top_risky_assets: ranked
            .into_iter()
            .take(TOP_ASSETS)
            .map(|p| AssetRiskSummary {
                asset_id: p.asset_id.clone(),
                asset_value: p.asset_value.clone(),
                risk_score: p.overall_risk,
                vulnerability_count: p.vulnerability_count,
            })
            .collect(),
        urgent_actions_required: distribution.critical > 0,
        calculated_at: now,
    }
}

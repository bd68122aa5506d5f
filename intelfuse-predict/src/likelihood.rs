// ---------------------------------------------------------------------------
// Attack likelihood prediction
// ---------------------------------------------------------------------------
//
// Weighted sum over five normalized factors:
//
//   exposure .25 + criticality .15 + threat landscape .30
//   + historical targeting .20 + vulnerability density .10

use chrono::{DateTime, Utc};
use intelfuse_types::{
    AssetSnapshot, AttackEvent, ConfidenceLabel, Criticality, Exposure, ThreatRecord, round_to,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Predicted window for the next attack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    WithinDays,
    WithinWeeks,
    WithinMonths,
    BeyondQuarter,
}

impl Timeframe {
    fn from_likelihood(likelihood: f64) -> Self {
        if likelihood >= 0.8 {
            Self::WithinDays
        } else if likelihood >= 0.6 {
            Self::WithinWeeks
        } else if likelihood >= 0.4 {
            Self::WithinMonths
        } else {
            Self::BeyondQuarter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodLabel {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
}

impl LikelihoodLabel {
    fn from_likelihood(likelihood: f64) -> Self {
        if likelihood >= 0.8 {
            Self::VeryHigh
        } else if likelihood >= 0.6 {
            Self::High
        } else if likelihood >= 0.4 {
            Self::Moderate
        } else if likelihood >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

/// The factor breakdown behind one prediction, each in [0,1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikelihoodFactors {
    pub exposure: f64,
    pub criticality: f64,
    pub threat_landscape: f64,
    pub historical_targeting: f64,
    pub vulnerability_density: f64,
}

/// Attack likelihood prediction for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackLikelihood {
    pub asset_id: String,
    pub likelihood: f64,
    pub likelihood_label: LikelihoodLabel,
    pub predicted_timeframe: Timeframe,
    pub factors: LikelihoodFactors,
    pub recommendations: Vec<String>,
    pub confidence: ConfidenceLabel,
    pub predicted_at: DateTime<Utc>,
}

/// Predict how likely an asset is to be attacked, based on its exposure and
/// criticality, the current threat landscape, how often it was hit before,
/// and how many open vulnerabilities it carries.
pub fn predict_attack_likelihood(
    asset: &AssetSnapshot,
    threat_intel: &[ThreatRecord],
    historical_attacks: &[AttackEvent],
    now: DateTime<Utc>,
) -> AttackLikelihood {
    let factors = LikelihoodFactors {
        exposure: exposure_score(asset.exposure),
        criticality: criticality_score(asset.criticality),
        threat_landscape: threat_landscape_score(threat_intel),
        historical_targeting: historical_targeting_score(asset, historical_attacks),
        vulnerability_density: (asset.vulnerability_ids.len() as f64 / 10.0).min(1.0),
    };

    let likelihood = factors.exposure * 0.25
        + factors.criticality * 0.15
        + factors.threat_landscape * 0.30
        + factors.historical_targeting * 0.20
        + factors.vulnerability_density * 0.10;

    debug!(asset = %asset.id, likelihood, "predicted attack likelihood");

    AttackLikelihood {
        asset_id: asset.id.clone(),
        likelihood: round_to(likelihood, 3),
        likelihood_label: LikelihoodLabel::from_likelihood(likelihood),
        predicted_timeframe: Timeframe::from_likelihood(likelihood),
        factors: LikelihoodFactors {
            exposure: round_to(factors.exposure, 3),
            criticality: round_to(factors.criticality, 3),
            threat_landscape: round_to(factors.threat_landscape, 3),
            historical_targeting: round_to(factors.historical_targeting, 3),
            vulnerability_density: round_to(factors.vulnerability_density, 3),
        },
        recommendations: protection_recommendations(likelihood, asset),
        confidence: ConfidenceLabel::Moderate,
        predicted_at: now,
    }
}

fn exposure_score(exposure: Exposure) -> f64 {
    match exposure {
        Exposure::InternetFacing => 1.0,
        Exposure::Dmz => 0.7,
        Exposure::Internal => 0.3,
        Exposure::Unknown => 0.5,
    }
}

fn criticality_score(criticality: Criticality) -> f64 {
    match criticality {
        Criticality::Critical => 1.0,
        Criticality::High => 0.7,
        Criticality::Medium => 0.5,
        Criticality::Low => 0.3,
        Criticality::Unknown => 0.5,
    }
}

/// Current landscape heat: each active campaign adds a tenth on top of a 0.3
/// baseline. No intelligence at all scores the bare baseline.
fn threat_landscape_score(threat_intel: &[ThreatRecord]) -> f64 {
    if threat_intel.is_empty() {
        return 0.3;
    }
    let active = threat_intel
        .iter()
        .filter(|t| t.active_exploitation || t.targeted_campaign)
        .count();
    (active as f64 / 10.0 + 0.3).min(1.0)
}

fn historical_targeting_score(asset: &AssetSnapshot, attacks: &[AttackEvent]) -> f64 {
    let hits = attacks.iter().filter(|a| a.target_asset_id == asset.id).count();
    (hits as f64 / 5.0).min(1.0)
}

fn protection_recommendations(likelihood: f64, asset: &AssetSnapshot) -> Vec<String> {
    let mut recs = Vec::new();
    if likelihood >= 0.7 {
        recs.push("Implement 24/7 monitoring for this asset".to_string());
        recs.push("Consider moving to more secure network segment".to_string());
    }
    if likelihood >= 0.5 {
        recs.push("Ensure all patches are current".to_string());
        recs.push("Review and strengthen access controls".to_string());
    }
    if asset.exposure == Exposure::InternetFacing {
        recs.push("Consider WAF or additional perimeter defense".to_string());
    }
    recs.push("Regular security assessments recommended".to_string());
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelfuse_types::AssetType;

    fn asset(exposure: Exposure, criticality: Criticality, vulns: usize) -> AssetSnapshot {
        let mut a = AssetSnapshot::new("asset-1", AssetType::Subdomain, "app.example.com");
        a.exposure = exposure;
        a.criticality = criticality;
        a.vulnerability_ids = (0..vulns).map(|i| format!("CVE-2024-{i:04}")).collect();
        a
    }

    fn active_threat(id: &str) -> ThreatRecord {
        ThreatRecord {
            id: id.into(),
            source_type: intelfuse_types::SourceType::Cybint,
            description: String::new(),
            cve_ids: vec![],
            active_exploitation: true,
            targeted_campaign: false,
            threat_actor: None,
            malware_family: None,
            timestamp: None,
        }
    }

    #[test]
    fn quiet_internal_asset_scores_low() {
        let now = Utc::now();
        let a = asset(Exposure::Internal, Criticality::Low, 0);
        let p = predict_attack_likelihood(&a, &[], &[], now);
        // .25*0.3 + .15*0.3 + .30*0.3 + .20*0 + .10*0 = 0.21
        assert!((p.likelihood - 0.21).abs() < 1e-9);
        assert_eq!(p.predicted_timeframe, Timeframe::BeyondQuarter);
        assert_eq!(p.likelihood_label, LikelihoodLabel::Low);
    }

    #[test]
    fn hot_asset_predicts_imminent_attack() {
        let now = Utc::now();
        let a = asset(Exposure::InternetFacing, Criticality::Critical, 12);
        let threats: Vec<ThreatRecord> =
            (0..8).map(|i| active_threat(&format!("t{i}"))).collect();
        let attacks: Vec<AttackEvent> = (0..6)
            .map(|_| AttackEvent { target_asset_id: "asset-1".into(), timestamp: now })
            .collect();

        let p = predict_attack_likelihood(&a, &threats, &attacks, now);
        // .25 + .15 + .30*1.0 + .20 + .10 = 1.0 (every factor saturated)
        assert!((p.likelihood - 1.0).abs() < 1e-9);
        assert_eq!(p.predicted_timeframe, Timeframe::WithinDays);
        assert_eq!(p.likelihood_label, LikelihoodLabel::VeryHigh);
        assert!(p.recommendations.contains(&"Implement 24/7 monitoring for this asset".to_string()));
        assert!(
            p.recommendations
                .contains(&"Consider WAF or additional perimeter defense".to_string())
        );
    }

    #[test]
    fn vulnerability_density_saturates_at_ten() {
        let now = Utc::now();
        let a = asset(Exposure::Unknown, Criticality::Unknown, 25);
        let p = predict_attack_likelihood(&a, &[], &[], now);
        assert_eq!(p.factors.vulnerability_density, 1.0);
    }

    #[test]
    fn attacks_on_other_assets_do_not_count() {
        let now = Utc::now();
        let a = asset(Exposure::Internal, Criticality::Medium, 0);
        let attacks = vec![AttackEvent { target_asset_id: "someone-else".into(), timestamp: now }];
        let p = predict_attack_likelihood(&a, &[], &attacks, now);
        assert_eq!(p.factors.historical_targeting, 0.0);
    }

    #[test]
    fn likelihood_stays_in_unit_range() {
        let now = Utc::now();
        let a = asset(Exposure::InternetFacing, Criticality::Critical, 100);
        let threats: Vec<ThreatRecord> =
            (0..50).map(|i| active_threat(&format!("t{i}"))).collect();
        let p = predict_attack_likelihood(&a, &threats, &[], now);
        assert!((0.0..=1.0).contains(&p.likelihood));
    }
}

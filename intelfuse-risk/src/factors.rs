// ---------------------------------------------------------------------------
// Risk factor tables
// ---------------------------------------------------------------------------
//
// All multipliers used by the contextual risk model. Thresholds and weights
// are a compatibility contract with existing consumers; change the model,
// and every stored assessment stops being comparable.

use chrono::{DateTime, Utc};
use intelfuse_types::{Criticality, ExploitStatus, Exposure, ThreatContext};
use serde::{Deserialize, Serialize};

/// The factor breakdown behind one risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub cvss_base: f64,
    pub asset_criticality: f64,
    pub exploit_availability: f64,
    pub threat_intelligence: f64,
    pub exposure: f64,
    pub age: f64,
    pub active_targeting: f64,
}

impl RiskFactors {
    /// Product of all multipliers applied to the CVSS base, capped at 10.0.
    pub fn final_score(&self) -> f64 {
        (self.cvss_base
            * self.asset_criticality
            * self.exploit_availability
            * self.threat_intelligence
            * self.exposure
            * self.age
            * self.active_targeting)
            .min(10.0)
    }
}

/// Crown jewels score up, disposable systems score down.
pub fn criticality_factor(criticality: Criticality) -> f64 {
    match criticality {
        Criticality::Critical => 1.5,
        Criticality::High => 1.3,
        Criticality::Medium => 1.0,
        Criticality::Low => 0.7,
        Criticality::Unknown => 1.0,
    }
}

/// Exploit ecosystem maturity multiplier. Unknown assumes moderate risk.
pub fn exploit_factor(status: ExploitStatus) -> f64 {
    match status {
        ExploitStatus::Weaponized => 2.0,
        ExploitStatus::Poc => 1.5,
        ExploitStatus::Theoretical => 1.0,
        ExploitStatus::Unknown => 1.2,
    }
}

/// Threat intelligence multiplier; the strongest applicable signal wins.
pub fn threat_intel_factor(context: Option<&ThreatContext>) -> f64 {
    let Some(ctx) = context else { return 1.0 };
    if ctx.active_exploitation {
        2.5
    } else if ctx.targeted_campaign {
        2.0
    } else if ctx.apt_linked {
        1.8
    } else if ctx.threat_mentions > 0 {
        1.3
    } else {
        1.0
    }
}

/// Active targeting multiplier: direct organization targeting outranks
/// industry-wide, which outranks regional.
pub fn targeting_factor(context: Option<&ThreatContext>) -> f64 {
    let Some(ctx) = context else { return 1.0 };
    if ctx.targeting_organization {
        2.0
    } else if ctx.targeting_industry {
        1.5
    } else if ctx.targeting_region {
        1.3
    } else {
        1.0
    }
}

/// Exposure multiplier. Unknown exposure assumes moderate reachability.
pub fn exposure_factor(exposure: Exposure) -> f64 {
    match exposure {
        Exposure::InternetFacing => 1.5,
        Exposure::Dmz => 1.3,
        Exposure::Internal => 1.0,
        Exposure::Unknown => 1.2,
    }
}

/// Age multiplier: fresh disclosures score up (patches scarce), old ones
/// decay. Missing publication date is neutral.
pub fn age_factor(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(published) = published else { return 1.0 };
    let age_days = (now - published).num_days();
    if age_days < 7 {
        1.4
    } else if age_days < 30 {
        1.2
    } else if age_days < 90 {
        1.0
    } else if age_days < 365 {
        0.9
    } else {
        0.8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn threat_intel_precedence() {
        let ctx = ThreatContext {
            active_exploitation: true,
            targeted_campaign: true,
            apt_linked: true,
            threat_mentions: 9,
            ..Default::default()
        };
        assert_eq!(threat_intel_factor(Some(&ctx)), 2.5);

        let ctx = ThreatContext { targeted_campaign: true, apt_linked: true, ..Default::default() };
        assert_eq!(threat_intel_factor(Some(&ctx)), 2.0);

        let ctx = ThreatContext { threat_mentions: 1, ..Default::default() };
        assert_eq!(threat_intel_factor(Some(&ctx)), 1.3);

        assert_eq!(threat_intel_factor(None), 1.0);
        assert_eq!(threat_intel_factor(Some(&ThreatContext::default())), 1.0);
    }

    #[test]
    fn age_bands() {
        let now = Utc::now();
        let days = |d: i64| Some(now - Duration::days(d));
        assert_eq!(age_factor(days(3), now), 1.4);
        assert_eq!(age_factor(days(10), now), 1.2);
        assert_eq!(age_factor(days(45), now), 1.0);
        assert_eq!(age_factor(days(180), now), 0.9);
        assert_eq!(age_factor(days(400), now), 0.8);
        assert_eq!(age_factor(None, now), 1.0);
        // A publication date in the future counts as brand new
        assert_eq!(age_factor(days(-2), now), 1.4);
    }

    #[test]
    fn final_score_caps_at_ten() {
        let factors = RiskFactors {
            cvss_base: 9.8,
            asset_criticality: 1.5,
            exploit_availability: 2.0,
            threat_intelligence: 2.5,
            exposure: 1.5,
            age: 1.4,
            active_targeting: 2.0,
        };
        assert_eq!(factors.final_score(), 10.0);
    }
}

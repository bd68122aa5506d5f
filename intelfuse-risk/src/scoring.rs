// ---------------------------------------------------------------------------
// Contextual risk scoring
// ---------------------------------------------------------------------------
//
// Multiplicative model on top of CVSS:
//
//   risk = cvss x criticality x exploit x threat_intel x exposure x age x targeting
//
// capped at 10.0. Severity bands as everywhere else; priority additionally
// escalates to urgent on active exploitation regardless of score.

use crate::factors::{
    self, RiskFactors, criticality_factor, exploit_factor, exposure_factor, targeting_factor,
    threat_intel_factor,
};
use chrono::{DateTime, Utc};
use intelfuse_types::{AssetSnapshot, Severity, ThreatContext, Vulnerability, round_to};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Remediation priority for one finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Risk assessment for one asset/vulnerability pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Contextual risk, 0.0-10.0, rounded to two decimals.
    pub risk_score: f64,
    pub severity: Severity,
    pub factors: RiskFactors,
    pub recommendations: Vec<String>,
    pub priority: Priority,
    pub calculated_at: DateTime<Utc>,
}

/// Score one vulnerability in the context of the asset it sits on and any
/// threat intelligence the caller resolved for it.
///
/// Pure: `now` is supplied so repeated calls over the same snapshot produce
/// identical output.
pub fn risk_score(
    asset: &AssetSnapshot,
    vulnerability: &Vulnerability,
    threat_context: Option<&ThreatContext>,
    now: DateTime<Utc>,
) -> RiskAssessment {
    let factors = RiskFactors {
        cvss_base: vulnerability.cvss_score,
        asset_criticality: criticality_factor(asset.criticality),
        exploit_availability: exploit_factor(vulnerability.exploit_status),
        threat_intelligence: threat_intel_factor(threat_context),
        exposure: exposure_factor(asset.exposure),
        age: factors::age_factor(vulnerability.published_date, now),
        active_targeting: targeting_factor(threat_context),
    };

    let score = factors.final_score();
    let severity = Severity::from_score(score);
    let priority = priority_for(score, &factors);

    debug!(
        asset = %asset.id,
        vuln = %vulnerability.id,
        score,
        severity = %severity,
        "scored vulnerability"
    );

    RiskAssessment {
        risk_score: round_to(score, 2),
        severity,
        recommendations: recommendations(score, &factors, vulnerability),
        priority,
        factors,
        calculated_at: now,
    }
}

/// Urgent on critical score or active exploitation, otherwise banded like
/// severity.
fn priority_for(score: f64, factors: &RiskFactors) -> Priority {
    if score >= 9.0 || factors.threat_intelligence >= 2.5 {
        Priority::Urgent
    } else if score >= 7.0 {
        Priority::High
    } else if score >= 4.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Deterministic, ordered recommendation list keyed off which factor
/// thresholds the assessment crossed, closed by a patch-availability line.
fn recommendations(
    score: f64,
    factors: &RiskFactors,
    vulnerability: &Vulnerability,
) -> Vec<String> {
    let mut recs = Vec::new();

    if factors.threat_intelligence >= 2.5 {
        recs.push("URGENT: Active exploitation detected - patch immediately".to_string());
    }
    if factors.active_targeting >= 2.0 {
        recs.push("WARNING: Your organization is being actively targeted".to_string());
    }

    if factors.exploit_availability >= 2.0 {
        recs.push("Public exploit code available - prioritize patching".to_string());
    } else if factors.exploit_availability >= 1.5 {
        recs.push("Proof of concept exploit exists - monitor closely".to_string());
    }

    if factors.asset_criticality >= 1.5 {
        recs.push("Critical asset affected - consider emergency patching".to_string());
    }
    if factors.exposure >= 1.5 {
        recs.push("Internet-facing asset - consider firewall rules or WAF".to_string());
    }
    if factors.age >= 1.4 {
        recs.push("Recent vulnerability - patches may be limited".to_string());
    }

    if score >= 9.0 {
        recs.push("Patch within 24 hours".to_string());
    } else if score >= 7.0 {
        recs.push("Patch within 7 days".to_string());
    } else if score >= 4.0 {
        recs.push("Patch within 30 days".to_string());
    }

    if vulnerability.patch_available {
        recs.push("Patch available - apply immediately".to_string());
    } else {
        recs.push("No patch available - implement compensating controls".to_string());
    }

    recs
}

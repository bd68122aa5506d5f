// ---------------------------------------------------------------------------
// Vulnerability / threat-intel cross-referencing
// ---------------------------------------------------------------------------

use intelfuse_confidence::multi_source_confidence;
use intelfuse_types::{
    ConfidenceLabel, Severity, SourceRef, SourceType, ThreatRecord, Vulnerability,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// A vulnerability with corroborating threat intelligence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnThreatCorrelation {
    pub cve_id: String,
    pub cvss_score: f64,
    pub severity: Severity,
    /// Number of threat reports referencing this CVE.
    pub threat_mentions: usize,
    pub active_exploitation: bool,
    pub threat_actors: Vec<String>,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    /// 2.5 under active exploitation, 1.0 otherwise. Consumed by risk scoring
    /// callers that want to escalate correlated findings.
    pub risk_multiplier: f64,
    pub recommendation: String,
}

/// Cross-reference CVE-shaped vulnerabilities against threat reports.
///
/// A report matches when it attributes the CVE id explicitly or when the id
/// appears as a substring of the upper-cased report body. The substring check
/// is deliberately loose and can false-positive on colliding text; it is kept
/// for output parity with the feeds this replaces.
pub fn correlate_vulnerabilities_with_threats(
    vulnerabilities: &[Vulnerability],
    threats: &[ThreatRecord],
) -> Vec<VulnThreatCorrelation> {
    info!(
        vulns = vulnerabilities.len(),
        threats = threats.len(),
        "correlating vulnerabilities with threat intel"
    );

    let mut correlations = Vec::new();

    for vuln in vulnerabilities {
        if !vuln.is_cve() {
            continue;
        }

        let related: Vec<&ThreatRecord> = threats
            .iter()
            .filter(|t| {
                t.cve_ids.iter().any(|id| id == &vuln.id)
                    || t.description.to_uppercase().contains(&vuln.id)
            })
            .collect();

        if related.is_empty() {
            continue;
        }

        // CVE data itself counts as a high-reputation technical source, then
        // each corroborating report adds its own discipline.
        let mut sources = vec![SourceRef::with_reputation(SourceType::Cybint, 0.9)];
        sources.extend(related.iter().map(|t| SourceRef::new(t.source_type)));
        let confidence = multi_source_confidence(&sources);

        let active_exploitation = related.iter().any(|t| t.active_exploitation);
        let threat_actors: BTreeSet<String> = related
            .iter()
            .filter_map(|t| t.threat_actor.clone())
            .collect();

        correlations.push(VulnThreatCorrelation {
            cve_id: vuln.id.clone(),
            cvss_score: vuln.cvss_score,
            severity: vuln.severity,
            threat_mentions: related.len(),
            active_exploitation,
            threat_actors: threat_actors.into_iter().collect(),
            confidence,
            confidence_label: ConfidenceLabel::from_score(confidence),
            risk_multiplier: if active_exploitation { 2.5 } else { 1.0 },
            recommendation: if confidence > 0.8 {
                "URGENT: Patch immediately".to_string()
            } else {
                "Prioritize patching".to_string()
            },
        });
    }

    correlations.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(b.cvss_score.total_cmp(&a.cvss_score))
    });
    info!(correlations = correlations.len(), "vulnerability-threat correlations");
    correlations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat(id: &str, source: SourceType) -> ThreatRecord {
        ThreatRecord {
            id: id.into(),
            source_type: source,
            description: String::new(),
            cve_ids: vec![],
            active_exploitation: false,
            targeted_campaign: false,
            threat_actor: None,
            malware_family: None,
            timestamp: None,
        }
    }

    #[test]
    fn non_cve_ids_are_skipped() {
        let vulns = vec![Vulnerability::new("GHSA-aaaa-bbbb", 9.0)];
        let mut t = threat("t1", SourceType::Osint);
        t.description = "mentions GHSA-aaaa-bbbb".into();
        assert!(correlate_vulnerabilities_with_threats(&vulns, &[t]).is_empty());
    }

    #[test]
    fn explicit_cve_attribution_matches() {
        let vulns = vec![Vulnerability::new("CVE-2024-1111", 8.1)];
        let mut t = threat("t1", SourceType::Sigint);
        t.cve_ids = vec!["CVE-2024-1111".into()];
        t.threat_actor = Some("FIN7".into());

        let out = correlate_vulnerabilities_with_threats(&vulns, &[t]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].threat_mentions, 1);
        assert_eq!(out[0].threat_actors, vec!["FIN7".to_string()]);
        assert_eq!(out[0].risk_multiplier, 1.0);
    }

    #[test]
    fn description_substring_matches() {
        let vulns = vec![Vulnerability::new("CVE-2024-2222", 7.5)];
        let mut t = threat("t1", SourceType::Osint);
        t.description = "Exploitation of cve-2024-2222 observed in the wild".into();
        t.active_exploitation = true;

        let out = correlate_vulnerabilities_with_threats(&vulns, &[t]);
        assert_eq!(out.len(), 1);
        assert!(out[0].active_exploitation);
        assert_eq!(out[0].risk_multiplier, 2.5);
        assert_eq!(out[0].recommendation, "URGENT: Patch immediately");
    }

    #[test]
    fn unreferenced_vulnerabilities_produce_nothing() {
        let vulns = vec![Vulnerability::new("CVE-2024-3333", 9.8)];
        let t = threat("t1", SourceType::Osint);
        assert!(correlate_vulnerabilities_with_threats(&vulns, &[t]).is_empty());
    }

    #[test]
    fn sorted_by_confidence_then_cvss() {
        let vulns = vec![
            Vulnerability::new("CVE-2024-0001", 5.0),
            Vulnerability::new("CVE-2024-0002", 9.8),
        ];
        // Both CVEs get one matching report of the same discipline, so the
        // confidence ties and CVSS breaks it.
        let mut t1 = threat("t1", SourceType::Osint);
        t1.cve_ids = vec!["CVE-2024-0001".into()];
        let mut t2 = threat("t2", SourceType::Osint);
        t2.cve_ids = vec!["CVE-2024-0002".into()];

        let out = correlate_vulnerabilities_with_threats(&vulns, &[t1, t2]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].cve_id, "CVE-2024-0002");
    }
}

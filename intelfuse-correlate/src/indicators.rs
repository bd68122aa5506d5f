// ---------------------------------------------------------------------------
// IOC correlation
// ---------------------------------------------------------------------------
//
// Groups indicators reported by independent feeds and promotes values seen
// more than once into confidence-scored clusters.

use chrono::{DateTime, Utc};
use intelfuse_confidence::multi_source_confidence;
use intelfuse_types::{ConfidenceLabel, Indicator, IocType, SourceRef, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// A cluster of indicators sharing the same normalized value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCluster {
    /// Case-normalized indicator value the cluster is keyed on.
    pub ioc_value: String,
    #[serde(rename = "ioc_type")]
    pub ioc_type: IocType,
    pub occurrence_count: usize,
    /// Source disciplines of the members, in member order.
    pub sources: Vec<SourceType>,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub threat_actors: Vec<String>,
    pub malware_families: Vec<String>,
    pub tags: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Correlate indicators across sources by value.
///
/// Values reported only once are dropped; surviving clusters carry a
/// multi-source confidence, merged attribution sets, and the min/max
/// observation window of their members. Output is sorted by confidence
/// descending.
pub fn correlate_indicators(indicators: &[Indicator]) -> Vec<IndicatorCluster> {
    info!(count = indicators.len(), "correlating indicators");

    let mut groups: BTreeMap<String, Vec<&Indicator>> = BTreeMap::new();
    for indicator in indicators {
        let value = indicator.value.to_lowercase();
        if value.is_empty() {
            continue;
        }
        groups.entry(value).or_default().push(indicator);
    }

    let mut clusters = Vec::new();
    for (value, group) in groups {
        if group.len() < 2 {
            continue;
        }

        let sources = member_sources(&group);
        let confidence = multi_source_confidence(&sources);

        let mut threat_actors = BTreeSet::new();
        let mut malware_families = BTreeSet::new();
        let mut tags = BTreeSet::new();
        for ioc in &group {
            if let Some(actor) = &ioc.threat_actor {
                threat_actors.insert(actor.clone());
            }
            if let Some(family) = &ioc.malware_family {
                malware_families.insert(family.clone());
            }
            tags.extend(ioc.tags.iter().cloned());
        }

        // Group has at least two members here, so min/max always exist.
        let first_seen = group.iter().map(|i| i.first_seen).min().unwrap_or(group[0].first_seen);
        let last_seen = group.iter().map(|i| i.last_seen).max().unwrap_or(group[0].last_seen);

        clusters.push(IndicatorCluster {
            ioc_value: value,
            ioc_type: group[0].ioc_type,
            occurrence_count: group.len(),
            sources: sources.iter().map(|s| s.source_type).collect(),
            confidence,
            confidence_label: ConfidenceLabel::from_score(confidence),
            threat_actors: threat_actors.into_iter().collect(),
            malware_families: malware_families.into_iter().collect(),
            tags: tags.into_iter().collect(),
            first_seen,
            last_seen,
        });
    }

    clusters.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    info!(clusters = clusters.len(), "correlated IOC clusters");
    clusters
}

/// Flatten member source attributions in member order. Indicators without
/// attribution contribute one unrecognized-discipline source so the member
/// still counts toward corroboration.
fn member_sources(group: &[&Indicator]) -> Vec<SourceRef> {
    let mut sources = Vec::new();
    for indicator in group {
        if indicator.sources.is_empty() {
            sources.push(SourceRef::new(SourceType::Other));
        } else {
            sources.extend(indicator.sources.iter().copied());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use intelfuse_confidence::source_confidence;

    fn indicator(id: &str, value: &str, source: SourceType, seen: DateTime<Utc>) -> Indicator {
        Indicator {
            id: id.into(),
            ioc_type: IocType::Ip,
            value: value.into(),
            confidence: 0.5,
            sources: vec![SourceRef::new(source)],
            first_seen: seen,
            last_seen: seen,
            threat_actor: None,
            malware_family: None,
            tags: vec![],
        }
    }

    #[test]
    fn singletons_are_dropped() {
        let now = Utc::now();
        let iocs = vec![
            indicator("a", "198.51.100.7", SourceType::Osint, now),
            indicator("b", "203.0.113.9", SourceType::Cybint, now),
        ];
        assert!(correlate_indicators(&iocs).is_empty());
    }

    #[test]
    fn same_value_different_case_clusters() {
        let now = Utc::now();
        let earlier = now - Duration::days(2);
        let mut a = indicator("a", "Evil.Example.COM", SourceType::Osint, earlier);
        a.threat_actor = Some("APT-29".into());
        let b = indicator("b", "evil.example.com", SourceType::Sigint, now);

        let clusters = correlate_indicators(&[a, b]);
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.ioc_value, "evil.example.com");
        assert_eq!(c.occurrence_count, 2);
        assert_eq!(c.first_seen, earlier);
        assert_eq!(c.last_seen, now);
        assert_eq!(c.threat_actors, vec!["APT-29".to_string()]);

        // Two disciplines: 15% boost plus diversity bonus, not the 5% path
        let expected = (source_confidence(SourceType::Osint, 0.8)
            + source_confidence(SourceType::Sigint, 0.8) * 0.15
            + 0.05)
            .min(1.0);
        assert!((c.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn clusters_sorted_by_confidence_desc() {
        let now = Utc::now();
        let iocs = vec![
            indicator("a", "weak.example.com", SourceType::Humint, now),
            indicator("b", "weak.example.com", SourceType::Humint, now),
            indicator("c", "strong.example.com", SourceType::Cybint, now),
            indicator("d", "strong.example.com", SourceType::Sigint, now),
        ];
        let clusters = correlate_indicators(&iocs);
        assert_eq!(clusters.len(), 2);
        assert!(clusters[0].confidence >= clusters[1].confidence);
        assert_eq!(clusters[0].ioc_value, "strong.example.com");
    }

    #[test]
    fn attribution_sets_merge_without_duplicates() {
        let now = Utc::now();
        let mut a = indicator("a", "1.2.3.4", SourceType::Osint, now);
        a.malware_family = Some("QakBot".into());
        a.tags = vec!["botnet".into()];
        let mut b = indicator("b", "1.2.3.4", SourceType::Osint, now);
        b.malware_family = Some("QakBot".into());
        b.tags = vec!["botnet".into(), "c2".into()];

        let clusters = correlate_indicators(&[a, b]);
        assert_eq!(clusters[0].malware_families, vec!["QakBot".to_string()]);
        assert_eq!(clusters[0].tags, vec!["botnet".to_string(), "c2".to_string()]);
    }
}

// ---------------------------------------------------------------------------
// Campaign identification
// ---------------------------------------------------------------------------

use crate::indicators::IndicatorCluster;
use crate::temporal::TemporalCluster;
use chrono::{DateTime, Utc};
use intelfuse_types::{ConfidenceLabel, IocType};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum cluster confidence before campaign promotion is considered.
const MIN_CAMPAIGN_CONFIDENCE: f64 = 0.7;

/// Occurrence count that promotes a cluster even without temporal support.
const STANDALONE_OCCURRENCES: usize = 3;

/// A suspected coordinated threat campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: String,
    pub ioc: String,
    pub ioc_type: IocType,
    pub threat_actors: Vec<String>,
    pub malware_families: Vec<String>,
    /// Temporal clusters whose events reference the IOC.
    pub temporal_clusters: usize,
    pub total_events: usize,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub first_observed: DateTime<Utc>,
    pub last_observed: DateTime<Utc>,
    pub assessment: String,
}

/// Promote strong IOC clusters to campaigns.
///
/// A cluster qualifies when its confidence is at least 0.7 and it is either
/// referenced by a temporal cluster's events or was seen more than three
/// times. Promotion boosts confidence by 10%, capped at 1.0.
pub fn identify_campaigns(
    ioc_clusters: &[IndicatorCluster],
    temporal_clusters: &[TemporalCluster],
) -> Vec<Campaign> {
    info!(
        ioc_clusters = ioc_clusters.len(),
        temporal_clusters = temporal_clusters.len(),
        "identifying campaigns"
    );

    let mut campaigns = Vec::new();

    for cluster in ioc_clusters {
        if cluster.confidence < MIN_CAMPAIGN_CONFIDENCE {
            continue;
        }

        let related: Vec<&TemporalCluster> = temporal_clusters
            .iter()
            .filter(|t| t.events.iter().any(|e| e.mentions(&cluster.ioc_value)))
            .collect();

        if related.is_empty() && cluster.occurrence_count <= STANDALONE_OCCURRENCES {
            continue;
        }

        let confidence = (cluster.confidence * 1.1).min(1.0);

        campaigns.push(Campaign {
            campaign_id: format!("campaign-{}", campaigns.len() + 1),
            ioc: cluster.ioc_value.clone(),
            ioc_type: cluster.ioc_type,
            threat_actors: cluster.threat_actors.clone(),
            malware_families: cluster.malware_families.clone(),
            temporal_clusters: related.len(),
            total_events: related.iter().map(|t| t.event_count).sum(),
            confidence,
            confidence_label: ConfidenceLabel::from_score(confidence),
            first_observed: cluster.first_seen,
            last_observed: cluster.last_seen,
            assessment: "Coordinated threat campaign detected based on correlated indicators \
                         and temporal patterns"
                .to_string(),
        });
    }

    campaigns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    info!(campaigns = campaigns.len(), "campaigns identified");
    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate_indicators;
    use crate::temporal_correlation;
    use chrono::Duration;
    use intelfuse_types::{EventRecord, Indicator, SourceRef, SourceType};

    fn indicator(id: &str, value: &str, source: SourceType) -> Indicator {
        let now = Utc::now();
        Indicator {
            id: id.into(),
            ioc_type: IocType::Domain,
            value: value.into(),
            confidence: 0.5,
            sources: vec![SourceRef::new(source)],
            first_seen: now,
            last_seen: now,
            threat_actor: Some("APT-41".into()),
            malware_family: None,
            tags: vec![],
        }
    }

    fn cluster_for(value: &str, sources: &[SourceType]) -> IndicatorCluster {
        let iocs: Vec<Indicator> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| indicator(&format!("i{i}"), value, *s))
            .collect();
        correlate_indicators(&iocs).remove(0)
    }

    #[test]
    fn low_confidence_clusters_never_promote() {
        // Two low-reputation humint sightings stay under the 0.7 bar
        let iocs: Vec<Indicator> = (0..2)
            .map(|i| Indicator {
                sources: vec![SourceRef::with_reputation(SourceType::Humint, 0.2)],
                ..indicator(&format!("i{i}"), "weak.example.com", SourceType::Humint)
            })
            .collect();
        let weak = correlate_indicators(&iocs).remove(0);
        assert!(weak.confidence < 0.7);
        assert!(identify_campaigns(&[weak], &[]).is_empty());
    }

    #[test]
    fn temporal_reference_promotes() {
        let strong = cluster_for("c2.example.com", &[SourceType::Cybint, SourceType::Sigint]);

        let base = Utc::now();
        let mut e1 = EventRecord::new("e1", base);
        e1.description = "Beaconing to C2.example.com".into();
        let mut e2 = EventRecord::new("e2", base + Duration::hours(1));
        e2.description = "Repeat contact with c2.example.com".into();
        let temporal = temporal_correlation(&[e1, e2], 24);

        let campaigns = identify_campaigns(std::slice::from_ref(&strong), &temporal);
        assert_eq!(campaigns.len(), 1);
        let c = &campaigns[0];
        assert_eq!(c.temporal_clusters, 1);
        assert_eq!(c.total_events, 2);
        assert!(c.confidence >= strong.confidence);
        assert!(c.confidence <= 1.0);
        assert_eq!(c.threat_actors, vec!["APT-41".to_string()]);
    }

    #[test]
    fn heavy_occurrence_promotes_without_temporal_support() {
        let heavy = cluster_for(
            "busy.example.com",
            &[SourceType::Cybint, SourceType::Sigint, SourceType::Osint, SourceType::Geoint],
        );
        assert!(heavy.occurrence_count > 3);
        let campaigns = identify_campaigns(&[heavy], &[]);
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].temporal_clusters, 0);
    }

    #[test]
    fn strong_cluster_without_support_or_volume_is_not_promoted() {
        let strong = cluster_for("quiet.example.com", &[SourceType::Cybint, SourceType::Sigint]);
        assert!(strong.confidence >= 0.7);
        assert!(identify_campaigns(&[strong], &[]).is_empty());
    }
}

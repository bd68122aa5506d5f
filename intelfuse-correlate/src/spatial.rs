// ---------------------------------------------------------------------------
// Spatial correlation
// ---------------------------------------------------------------------------

use intelfuse_confidence::multi_source_confidence;
use intelfuse_types::{ConfidenceLabel, GeoRecord, SourceRef, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Minimum cluster size before a location grouping is reported.
const MIN_CLUSTER_SIZE: usize = 3;

/// Entities clustered in one geographic location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialCluster {
    pub location: String,
    pub entity_count: usize,
    pub entity_types: Vec<String>,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    /// Member entity ids.
    pub entities: Vec<String>,
    pub analysis: String,
}

/// Correlate entities by geographic location.
///
/// Groups on country, falling back to region and then free-form location.
/// Only locations with more than two entities are reported, sorted by member
/// count descending.
pub fn spatial_correlation(records: &[GeoRecord]) -> Vec<SpatialCluster> {
    info!(entities = records.len(), "spatial correlation");

    let mut groups: BTreeMap<&str, Vec<&GeoRecord>> = BTreeMap::new();
    for record in records {
        if let Some(key) = record.location_key() {
            groups.entry(key).or_default().push(record);
        }
    }

    let mut clusters = Vec::new();
    for (location, group) in groups {
        if group.len() < MIN_CLUSTER_SIZE {
            continue;
        }

        let sources: Vec<SourceRef> = group
            .iter()
            .map(|e| SourceRef::new(e.source_type.unwrap_or(SourceType::Geoint)))
            .collect();
        let confidence = multi_source_confidence(&sources);

        let entity_types: BTreeSet<String> = group
            .iter()
            .filter_map(|e| e.entity_type.clone())
            .collect();

        clusters.push(SpatialCluster {
            location: location.to_string(),
            entity_count: group.len(),
            entity_types: entity_types.into_iter().collect(),
            confidence,
            confidence_label: ConfidenceLabel::from_score(confidence),
            entities: group.iter().map(|e| e.id.clone()).collect(),
            analysis: format!("Detected {} entities clustered in {}", group.len(), location),
        });
    }

    clusters.sort_by(|a, b| b.entity_count.cmp(&a.entity_count));
    info!(clusters = clusters.len(), "spatial clusters");
    clusters
}

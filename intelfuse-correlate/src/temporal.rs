// ---------------------------------------------------------------------------
// Temporal correlation
// ---------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};
use intelfuse_confidence::multi_source_confidence;
use intelfuse_types::{ConfidenceLabel, EventRecord, SourceRef, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Default correlation window when the caller does not pick one.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// A group of events that occurred within one correlation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalCluster {
    pub cluster_id: String,
    pub event_count: usize,
    pub time_span_hours: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Distinct source disciplines seen across members.
    pub sources: Vec<SourceType>,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub events: Vec<EventRecord>,
    pub analysis: String,
}

/// Find events that occurred within a shared temporal window.
///
/// Events are sorted by timestamp and clustered greedily: a cluster accepts
/// every event within `window_hours` of the cluster's FIRST event, so the
/// window anchors to cluster start rather than sliding with each member.
/// Clusters of one are dropped. Events without a timestamp are skipped.
pub fn temporal_correlation(events: &[EventRecord], window_hours: i64) -> Vec<TemporalCluster> {
    info!(events = events.len(), window_hours, "temporal correlation");

    let window = Duration::hours(window_hours);

    let mut timed: Vec<(&EventRecord, DateTime<Utc>)> = events
        .iter()
        .filter_map(|e| e.timestamp.map(|ts| (e, ts)))
        .collect();
    timed.sort_by_key(|(_, ts)| *ts);

    let mut groups: Vec<Vec<(&EventRecord, DateTime<Utc>)>> = Vec::new();
    let mut current: Vec<(&EventRecord, DateTime<Utc>)> = Vec::new();
    let mut anchor: Option<DateTime<Utc>> = None;

    for (event, ts) in timed {
        match anchor {
            Some(start) if ts - start <= window => current.push((event, ts)),
            _ => {
                if current.len() > 1 {
                    groups.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current.push((event, ts));
                anchor = Some(ts);
            }
        }
    }
    if current.len() > 1 {
        groups.push(current);
    }

    let clusters: Vec<TemporalCluster> = groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| build_cluster(idx, group, window_hours))
        .collect();

    info!(clusters = clusters.len(), "temporal clusters");
    clusters
}

fn build_cluster(
    idx: usize,
    group: Vec<(&EventRecord, DateTime<Utc>)>,
    window_hours: i64,
) -> TemporalCluster {
    let start_time = group[0].1;
    let end_time = group[group.len() - 1].1;

    let sources: Vec<SourceRef> = group
        .iter()
        .map(|(e, _)| SourceRef::new(e.source_type.unwrap_or(SourceType::Osint)))
        .collect();
    let confidence = multi_source_confidence(&sources);

    let distinct: BTreeSet<SourceType> = sources.iter().map(|s| s.source_type).collect();

    TemporalCluster {
        cluster_id: format!("temporal-cluster-{}", idx + 1),
        event_count: group.len(),
        time_span_hours: (end_time - start_time).num_seconds() as f64 / 3600.0,
        start_time,
        end_time,
        sources: distinct.into_iter().collect(),
        confidence,
        confidence_label: ConfidenceLabel::from_score(confidence),
        events: group.iter().map(|(e, _)| (*e).clone()).collect(),
        analysis: format!(
            "Detected {} related events within {}h window",
            group.len(),
            window_hours
        ),
    }
}

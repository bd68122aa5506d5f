// ---------------------------------------------------------------------------
// Emerging threat detection
// ---------------------------------------------------------------------------

use intelfuse_types::{Severity, ThreatRecord, round_to};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    ThreatActor,
    Malware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergingStatus {
    /// Not present in the baseline at all.
    New,
    /// Present, but recent activity more than doubled the baseline.
    Escalating,
}

/// A threat actor or malware family whose activity departs from baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingThreat {
    #[serde(rename = "type")]
    pub kind: ThreatKind,
    pub name: String,
    pub status: EmergingStatus,
    pub recent_activity: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_activity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase_percentage: Option<f64>,
    pub severity: Severity,
}

/// Compare recent intelligence against a historical baseline and surface
/// actors and malware families that are new or escalating.
///
/// Callers pre-split the two windows; this function only counts mentions.
/// Severity scales with magnitude: a brand-new actor with more than five
/// sightings or an escalation above 300% is high, everything else medium.
pub fn identify_emerging_threats(
    recent: &[ThreatRecord],
    baseline: &[ThreatRecord],
) -> Vec<EmergingThreat> {
    let recent_actors = count_by(recent, |t| t.threat_actor.as_deref());
    let recent_malware = count_by(recent, |t| t.malware_family.as_deref());
    let baseline_actors = count_by(baseline, |t| t.threat_actor.as_deref());
    let baseline_malware = count_by(baseline, |t| t.malware_family.as_deref());

    let mut threats = Vec::new();

    for (actor, &recent_count) in &recent_actors {
        let baseline_count = baseline_actors.get(actor).copied().unwrap_or(0);
        if baseline_count == 0 {
            threats.push(EmergingThreat {
                kind: ThreatKind::ThreatActor,
                name: (*actor).to_string(),
                status: EmergingStatus::New,
                recent_activity: recent_count,
                baseline_activity: None,
                increase_percentage: None,
                severity: if recent_count > 5 { Severity::High } else { Severity::Medium },
            });
        } else if recent_count > baseline_count * 2 {
            let increase =
                (recent_count - baseline_count) as f64 / baseline_count as f64 * 100.0;
            threats.push(EmergingThreat {
                kind: ThreatKind::ThreatActor,
                name: (*actor).to_string(),
                status: EmergingStatus::Escalating,
                recent_activity: recent_count,
                baseline_activity: Some(baseline_count),
                increase_percentage: Some(round_to(increase, 1)),
                severity: if increase > 300.0 { Severity::High } else { Severity::Medium },
            });
        }
    }

    for (malware, &recent_count) in &recent_malware {
        let baseline_count = baseline_malware.get(malware).copied().unwrap_or(0);
        // Malware needs a little volume before a first sighting means much
        if baseline_count == 0 && recent_count > 2 {
            threats.push(EmergingThreat {
                kind: ThreatKind::Malware,
                name: (*malware).to_string(),
                status: EmergingStatus::New,
                recent_activity: recent_count,
                baseline_activity: None,
                increase_percentage: None,
                severity: if recent_count > 10 { Severity::High } else { Severity::Medium },
            });
        }
    }

    threats.sort_by(|a, b| {
        b.recent_activity
            .cmp(&a.recent_activity)
            .then_with(|| a.name.cmp(&b.name))
    });
    info!(
        recent = recent.len(),
        baseline = baseline.len(),
        emerging = threats.len(),
        "emerging threat detection"
    );
    threats
}

fn count_by<'a>(
    records: &'a [ThreatRecord],
    pick: impl Fn(&'a ThreatRecord) -> Option<&'a str>,
) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(name) = pick(record) {
            *counts.entry(name).or_default() += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Path ranking and chokepoint detection
// ---------------------------------------------------------------------------

use crate::analyzer::PathReport;
use intelfuse_types::round_to;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A path report with its position in the risk-ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPath {
    pub rank: usize,
    #[serde(flatten)]
    pub report: PathReport,
}

/// A node recurring across multiple analyzed paths. Hardening it disrupts
/// every path it sits on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChokePoint {
    pub node_id: String,
    /// Number of analyzed paths containing the node.
    pub frequency: usize,
    /// Mean overall risk of those paths.
    pub average_risk: f64,
    /// frequency x average risk; the sort key.
    pub criticality_score: f64,
    pub recommendation: String,
}

/// Order analyzed paths by overall risk, highest first, with contiguous
/// 1-based ranks.
pub fn rank_attack_paths(mut reports: Vec<PathReport>) -> Vec<RankedPath> {
    reports.sort_by(|a, b| b.overall_risk.total_cmp(&a.overall_risk));
    reports
        .into_iter()
        .enumerate()
        .map(|(idx, report)| RankedPath { rank: idx + 1, report })
        .collect()
}

/// Find nodes that appear in more than one analyzed path.
///
/// Output is sorted by criticality score descending. Nodes seen in a single
/// path never qualify: a chokepoint is only interesting when fixing it cuts
/// several routes at once.
pub fn identify_critical_nodes(reports: &[PathReport]) -> Vec<ChokePoint> {
    let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total_risk: BTreeMap<&str, f64> = BTreeMap::new();

    for report in reports {
        // A node revisited within one path still counts that path once.
        let distinct: std::collections::BTreeSet<&str> =
            report.nodes.iter().map(|n| n.id.as_str()).collect();
        for node_id in distinct {
            *frequency.entry(node_id).or_default() += 1;
            *total_risk.entry(node_id).or_default() += report.overall_risk;
        }
    }

    let mut chokepoints: Vec<ChokePoint> = frequency
        .into_iter()
        .filter(|(_, freq)| *freq > 1)
        .map(|(node_id, freq)| {
            let avg = total_risk[node_id] / freq as f64;
            ChokePoint {
                node_id: node_id.to_string(),
                frequency: freq,
                average_risk: round_to(avg, 2),
                criticality_score: round_to(freq as f64 * avg, 2),
                recommendation: format!(
                    "Critical chokepoint - securing this node blocks {freq} attack paths"
                ),
            }
        })
        .collect();

    chokepoints.sort_by(|a, b| b.criticality_score.total_cmp(&a.criticality_score));
    info!(chokepoints = chokepoints.len(), paths = reports.len(), "identified chokepoints");
    chokepoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_path;
    use chrono::Utc;
    use intelfuse_types::{AssetType, Criticality, PathNode};

    fn node(id: &str, criticality: Criticality) -> PathNode {
        let mut n = PathNode::new(id, AssetType::Service, format!("{id}.internal"));
        n.criticality = criticality;
        n
    }

    fn report(nodes: &[PathNode]) -> PathReport {
        analyze_path(nodes, &[], Utc::now())
            .report()
            .expect("valid path")
            .clone()
    }

    #[test]
    fn ranking_is_descending_and_contiguous() {
        let low = report(&[node("a", Criticality::Low), node("b", Criticality::Low)]);
        let high = report(&[node("c", Criticality::Low), node("d", Criticality::Critical)]);
        let mid = report(&[node("e", Criticality::Low), node("f", Criticality::Medium)]);

        let ranked = rank_attack_paths(vec![low, high, mid]);
        assert_eq!(ranked.len(), 3);
        for (idx, rp) in ranked.iter().enumerate() {
            assert_eq!(rp.rank, idx + 1);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].report.overall_risk >= pair[1].report.overall_risk);
        }
        assert_eq!(ranked[0].report.target, "d.internal");
    }

    #[test]
    fn ranking_empty_input() {
        assert!(rank_attack_paths(vec![]).is_empty());
    }

    #[test]
    fn chokepoints_require_multiple_paths() {
        let shared = node("pivot", Criticality::High);
        let p1 = report(&[node("a", Criticality::Low), shared.clone(), node("t1", Criticality::Critical)]);
        let p2 = report(&[node("b", Criticality::Low), shared.clone(), node("t2", Criticality::High)]);

        let chokepoints = identify_critical_nodes(&[p1.clone(), p2.clone()]);
        assert_eq!(chokepoints.len(), 1);
        let cp = &chokepoints[0];
        assert_eq!(cp.node_id, "pivot");
        assert_eq!(cp.frequency, 2);

        let expected_avg = (p1.overall_risk + p2.overall_risk) / 2.0;
        assert!((cp.average_risk - round_to(expected_avg, 2)).abs() < 0.01);
        assert!((cp.criticality_score - round_to(2.0 * expected_avg, 2)).abs() < 0.02);
    }

    #[test]
    fn single_path_nodes_never_reported() {
        let p = report(&[node("a", Criticality::Low), node("b", Criticality::High)]);
        assert!(identify_critical_nodes(std::slice::from_ref(&p)).is_empty());
    }

    #[test]
    fn chokepoints_sorted_by_score() {
        let hub = node("hub", Criticality::High);
        let side = node("side", Criticality::Low);
        let p1 = report(&[hub.clone(), side.clone(), node("t1", Criticality::Critical)]);
        let p2 = report(&[hub.clone(), node("x", Criticality::Low), node("t2", Criticality::Critical)]);
        let p3 = report(&[hub.clone(), side.clone(), node("t3", Criticality::Low)]);

        let chokepoints = identify_critical_nodes(&[p1, p2, p3]);
        assert!(chokepoints.len() >= 2);
        assert_eq!(chokepoints[0].node_id, "hub");
        for pair in chokepoints.windows(2) {
            assert!(pair[0].criticality_score >= pair[1].criticality_score);
        }
    }
}

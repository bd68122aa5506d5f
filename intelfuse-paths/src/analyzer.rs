// ---------------------------------------------------------------------------
// Attack path analysis
// ---------------------------------------------------------------------------
//
// Scores an externally traversed node sequence. The graph collaborator does
// the walking; this module only judges what came back:
//
//   likelihood    = clamp01(0.9 x 0.95^(len-1) x exploit x controls)
//   difficulty    = clamp10(1.5 len + avg exploit difficulty + 0.5 len)
//   detectability = clamp01(0.5 + min(0.3, 0.05 len) + node bonuses)
//   impact        = clamp10(target criticality impact + critical node bonus)
//   overall risk  = clamp10(likelihood x impact x (1 - detectability) x 1.5)

use chrono::{DateTime, Utc};
use intelfuse_types::{
    AssetType, Capability, Criticality, ExploitStatus, PathNode, Vulnerability, round_to,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attacker skill tier implied by path difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Low,
    Medium,
    High,
    Expert,
}

impl SkillLevel {
    /// Band on difficulty: expert >= 8, high >= 6, medium >= 3, else low.
    fn from_difficulty(difficulty: f64) -> Self {
        if difficulty >= 8.0 {
            Self::Expert
        } else if difficulty >= 6.0 {
            Self::High
        } else if difficulty >= 3.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Path risk band. Thresholds differ from vulnerability severity on purpose:
/// a 7.0 path risk already means a likely, damaging, hard-to-spot route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            Self::Critical
        } else if score >= 5.0 {
            Self::High
        } else if score >= 3.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Node view embedded in a path report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathNodeSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: AssetType,
    pub value: String,
    pub criticality: Criticality,
}

/// Full analysis of one viable-or-not attack path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathReport {
    pub viable: bool,
    pub path_length: usize,
    pub source: String,
    pub target: String,
    pub likelihood: f64,
    pub difficulty: f64,
    pub detectability: f64,
    pub impact: f64,
    pub skill_required: SkillLevel,
    pub estimated_time: String,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    pub nodes: Vec<PathNodeSummary>,
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Analysis outcome. Paths under two nodes are structurally invalid and get a
/// reason instead of metrics, so callers can render the case gracefully.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathAnalysis {
    Invalid { reason: String },
    Analyzed(Box<PathReport>),
}

impl PathAnalysis {
    pub fn report(&self) -> Option<&PathReport> {
        match self {
            Self::Analyzed(report) => Some(report),
            Self::Invalid { .. } => None,
        }
    }
}

struct PathMetrics {
    likelihood: f64,
    difficulty: f64,
    detectability: f64,
    impact: f64,
    skill_required: SkillLevel,
    time_estimate: String,
}

/// Per-vulnerability exploitation difficulty (0-10, lower is easier).
fn exploit_difficulty(status: ExploitStatus) -> f64 {
    match status {
        ExploitStatus::Weaponized => 1.0,
        ExploitStatus::Poc => 3.0,
        ExploitStatus::Theoretical => 7.0,
        ExploitStatus::Unknown => 5.0,
    }
}

/// Impact contribution of the target asset's criticality.
fn criticality_impact(criticality: Criticality) -> f64 {
    match criticality {
        Criticality::Critical => 10.0,
        Criticality::High => 7.0,
        Criticality::Medium => 5.0,
        Criticality::Low => 3.0,
        Criticality::Unknown => 5.0,
    }
}

/// Analyze a single attack path.
///
/// Pure over its inputs; `now` stamps the report. Paths shorter than two
/// nodes cannot represent movement and come back invalid.
pub fn analyze_path(
    nodes: &[PathNode],
    vulnerabilities: &[Vulnerability],
    now: DateTime<Utc>,
) -> PathAnalysis {
    if nodes.len() < 2 {
        return PathAnalysis::Invalid { reason: "Path too short".to_string() };
    }

    let metrics = path_metrics(nodes, vulnerabilities);
    let viable = metrics.likelihood > 0.1 && metrics.difficulty < 9.5;
    let risk = (metrics.likelihood * metrics.impact * (1.0 - metrics.detectability) * 1.5)
        .min(10.0);

    debug!(
        len = nodes.len(),
        likelihood = metrics.likelihood,
        risk,
        viable,
        "analyzed attack path"
    );

    let recommendations = path_recommendations(nodes, &metrics, vulnerabilities);

    PathAnalysis::Analyzed(Box::new(PathReport {
        viable,
        path_length: nodes.len(),
        source: nodes[0].value.clone(),
        target: nodes[nodes.len() - 1].value.clone(),
        likelihood: round_to(metrics.likelihood, 3),
        difficulty: round_to(metrics.difficulty, 2),
        detectability: round_to(metrics.detectability, 3),
        impact: round_to(metrics.impact, 2),
        skill_required: metrics.skill_required,
        estimated_time: metrics.time_estimate,
        overall_risk: round_to(risk, 2),
        risk_level: RiskLevel::from_score(risk),
        nodes: nodes
            .iter()
            .map(|n| PathNodeSummary {
                id: n.id.clone(),
                node_type: n.node_type,
                value: n.value.clone(),
                criticality: n.criticality,
            })
            .collect(),
        recommendations,
        analyzed_at: now,
    }))
}

fn path_metrics(nodes: &[PathNode], vulnerabilities: &[Vulnerability]) -> PathMetrics {
    let len = nodes.len();
    let avg_exploit = if vulnerabilities.is_empty() {
        None
    } else {
        Some(
            vulnerabilities
                .iter()
                .map(|v| exploit_difficulty(v.exploit_status))
                .sum::<f64>()
                / vulnerabilities.len() as f64,
        )
    };

    // Likelihood: each hop gives the attacker another chance to fail, exploit
    // maturity converts inversely, and every control group observed on a node
    // shaves off 10%.
    let length_factor = 0.95f64.powi(len as i32 - 1);
    let exploit_factor = avg_exploit.map_or(1.0, |d| 1.0 - d / 10.0);
    let control_factor = 0.9f64.powi(count_controls(nodes) as i32);
    let likelihood = (0.9 * length_factor * exploit_factor * control_factor).clamp(0.0, 1.0);

    // Difficulty: path length (steps plus traversal) and exploit maturity.
    let difficulty = (1.5 * len as f64 + avg_exploit.unwrap_or(0.0) + 0.5 * len as f64).min(10.0);

    // Detectability: longer paths are noisier, monitored/logged nodes see more.
    let mut detect = 0.5 + (0.05 * len as f64).min(0.3);
    for node in nodes {
        if node.capabilities.contains(&Capability::Monitored) {
            detect += 0.1;
        }
        if node.capabilities.contains(&Capability::Logged) {
            detect += 0.05;
        }
    }
    let detectability = detect.clamp(0.0, 1.0);

    // Impact: target criticality plus a bonus when the route crosses other
    // critical assets.
    let critical_count = nodes.iter().filter(|n| n.criticality == Criticality::Critical).count();
    let impact = (criticality_impact(nodes[len - 1].criticality)
        + (critical_count as f64 * 0.5).min(2.0))
    .min(10.0);

    PathMetrics {
        likelihood,
        difficulty,
        detectability,
        impact,
        skill_required: SkillLevel::from_difficulty(difficulty),
        time_estimate: estimate_time(difficulty, len),
    }
}

/// One increment per control group present on each node: perimeter filtering
/// (waf/firewall), strong auth (mfa/2fa), endpoint detection (edr/ids).
fn count_controls(nodes: &[PathNode]) -> usize {
    let groups: [&[Capability]; 3] = [
        &[Capability::Waf, Capability::Firewall],
        &[Capability::Mfa, Capability::TwoFactor],
        &[Capability::Edr, Capability::Ids],
    ];
    nodes
        .iter()
        .map(|node| groups.iter().filter(|g| node.has_any(g)).count())
        .sum()
}

/// Bucket difficulty x length into a human exploitation-time estimate.
fn estimate_time(difficulty: f64, path_length: usize) -> String {
    let hours = difficulty * path_length as f64;
    if hours < 1.0 {
        "< 1 hour".to_string()
    } else if hours < 8.0 {
        format!("{} hours", hours as u64)
    } else if hours < 40.0 {
        format!("{} days", (hours / 8.0) as u64)
    } else if hours < 160.0 {
        format!("{} weeks", (hours / 40.0) as u64)
    } else {
        format!("{} months", (hours / 160.0) as u64)
    }
}

fn path_recommendations(
    nodes: &[PathNode],
    metrics: &PathMetrics,
    vulnerabilities: &[Vulnerability],
) -> Vec<String> {
    let mut recs = Vec::new();

    if metrics.likelihood > 0.7 {
        recs.push(
            "HIGH LIKELIHOOD: This attack path is highly exploitable - immediate action required"
                .to_string(),
        );
    }
    if metrics.impact >= 8.0 {
        recs.push("HIGH IMPACT: Target is critical asset - prioritize protection".to_string());
    }
    if metrics.detectability < 0.3 {
        recs.push(
            "LOW DETECTABILITY: Implement monitoring and logging along this path".to_string(),
        );
    }

    for vuln in vulnerabilities {
        if vuln.exploit_status == ExploitStatus::Weaponized {
            recs.push(format!("Patch {} immediately - public exploits available", vuln.id));
        }
    }

    if nodes.len() <= 2 {
        recs.push("Short attack path - implement defense in depth".to_string());
    }
    if metrics.skill_required == SkillLevel::Low {
        recs.push("Low skill required - script kiddies could exploit this path".to_string());
    }

    recs.push(format!(
        "Estimated exploitation time: {} - ensure detection within this window",
        metrics.time_estimate
    ));
    recs.push("Consider network segmentation to break attack path".to_string());
    recs.push("Implement principle of least privilege".to_string());

    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, criticality: Criticality) -> PathNode {
        let mut n = PathNode::new(id, AssetType::Service, format!("{id}.internal"));
        n.criticality = criticality;
        n
    }

    fn vuln(status: ExploitStatus) -> Vulnerability {
        let mut v = Vulnerability::new("CVE-2024-0001", 8.0);
        v.exploit_status = status;
        v
    }

    #[test]
    fn short_path_is_invalid() {
        let now = Utc::now();
        let single = [node("a", Criticality::High)];
        match analyze_path(&single, &[], now) {
            PathAnalysis::Invalid { reason } => assert_eq!(reason, "Path too short"),
            PathAnalysis::Analyzed(_) => panic!("single-node path must be invalid"),
        }
        assert!(analyze_path(&[], &[], now).report().is_none());
    }

    #[test]
    fn metrics_stay_in_documented_ranges() {
        let now = Utc::now();
        let nodes: Vec<PathNode> =
            (0..12).map(|i| node(&format!("n{i}"), Criticality::Critical)).collect();
        let vulns = vec![vuln(ExploitStatus::Weaponized); 4];

        let report = analyze_path(&nodes, &vulns, now);
        let r = report.report().expect("valid path");
        assert!((0.0..=1.0).contains(&r.likelihood));
        assert!((0.0..=10.0).contains(&r.difficulty));
        assert!((0.0..=1.0).contains(&r.detectability));
        assert!((0.0..=10.0).contains(&r.impact));
        assert!((0.0..=10.0).contains(&r.overall_risk));
    }

    #[test]
    fn weaponized_exploits_raise_likelihood() {
        let now = Utc::now();
        let nodes = [node("a", Criticality::Medium), node("b", Criticality::High)];

        let mut last = 0.0;
        for status in [ExploitStatus::Theoretical, ExploitStatus::Poc, ExploitStatus::Weaponized] {
            let analysis = analyze_path(&nodes, &[vuln(status)], now);
            let r = analysis.report().unwrap();
            assert!(
                r.likelihood >= last,
                "{status} gave likelihood {} below {last}",
                r.likelihood
            );
            last = r.likelihood;
        }
    }

    #[test]
    fn security_controls_lower_likelihood() {
        let now = Utc::now();
        let bare = [node("a", Criticality::Medium), node("b", Criticality::High)];

        let mut hardened = bare.clone();
        hardened[0].capabilities.insert(Capability::Waf);
        hardened[0].capabilities.insert(Capability::Mfa);
        hardened[1].capabilities.insert(Capability::Edr);

        let open = analyze_path(&bare, &[], now);
        let guarded = analyze_path(&hardened, &[], now);
        assert!(guarded.report().unwrap().likelihood < open.report().unwrap().likelihood);
    }

    #[test]
    fn waf_and_firewall_on_one_node_count_once() {
        let mut n = node("a", Criticality::Medium);
        n.capabilities.insert(Capability::Waf);
        n.capabilities.insert(Capability::Firewall);
        assert_eq!(count_controls(&[n]), 1);
    }

    #[test]
    fn monitored_nodes_raise_detectability() {
        let now = Utc::now();
        let quiet = [node("a", Criticality::Medium), node("b", Criticality::High)];
        let mut watched = quiet.clone();
        watched[0].capabilities.insert(Capability::Monitored);
        watched[1].capabilities.insert(Capability::Logged);

        let q = analyze_path(&quiet, &[], now);
        let w = analyze_path(&watched, &[], now);
        let q = q.report().unwrap();
        let w = w.report().unwrap();
        assert!(w.detectability > q.detectability);
        assert!(w.overall_risk <= q.overall_risk);
    }

    #[test]
    fn impact_tracks_target_criticality() {
        let now = Utc::now();
        let to_critical = [node("a", Criticality::Low), node("b", Criticality::Critical)];
        let to_low = [node("a", Criticality::Low), node("b", Criticality::Low)];

        let hi = analyze_path(&to_critical, &[], now);
        let lo = analyze_path(&to_low, &[], now);
        assert!(hi.report().unwrap().impact > lo.report().unwrap().impact);
        // target critical (10.0) plus one critical node on path (0.5), capped
        assert_eq!(hi.report().unwrap().impact, 10.0);
    }

    #[test]
    fn analysis_is_idempotent_given_same_clock() {
        let now = Utc::now();
        let nodes = [node("a", Criticality::Medium), node("b", Criticality::High)];
        let vulns = [vuln(ExploitStatus::Poc)];

        let a = serde_json::to_value(analyze_path(&nodes, &vulns, now)).unwrap();
        let b = serde_json::to_value(analyze_path(&nodes, &vulns, now)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn weaponized_vuln_adds_patch_recommendation() {
        let now = Utc::now();
        let nodes = [node("a", Criticality::Medium), node("b", Criticality::High)];
        let analysis = analyze_path(&nodes, &[vuln(ExploitStatus::Weaponized)], now);
        let r = analysis.report().unwrap();
        assert!(
            r.recommendations
                .iter()
                .any(|rec| rec == "Patch CVE-2024-0001 immediately - public exploits available")
        );
        // Two fixed mitigations always close the list
        let n = r.recommendations.len();
        assert_eq!(r.recommendations[n - 2], "Consider network segmentation to break attack path");
        assert_eq!(r.recommendations[n - 1], "Implement principle of least privilege");
    }

    #[test]
    fn time_buckets() {
        assert_eq!(estimate_time(0.4, 2), "< 1 hour");
        assert_eq!(estimate_time(3.0, 2), "6 hours");
        assert_eq!(estimate_time(5.0, 4), "2 days");
        assert_eq!(estimate_time(9.0, 6), "1 weeks");
        assert_eq!(estimate_time(10.0, 20), "1 months");
    }

    #[test]
    fn invalid_serializes_with_status_tag() {
        let now = Utc::now();
        let json = serde_json::to_value(analyze_path(&[], &[], now)).unwrap();
        assert_eq!(json["status"], "invalid");
    }
}

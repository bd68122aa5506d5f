use crate::asset::{AssetType, Capability, Criticality};
use crate::vuln::Vulnerability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Simplified asset view used inside an attack path.
///
/// The graph collaborator resolves full assets down to this shape when it
/// returns a traversal, including the precomputed capability set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: AssetType,
    pub value: String,
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl PathNode {
    pub fn new(id: impl Into<String>, node_type: AssetType, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            value: value.into(),
            criticality: Criticality::Unknown,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn has_any(&self, caps: &[Capability]) -> bool {
        caps.iter().any(|c| self.capabilities.contains(c))
    }
}

/// An externally resolved attack path: an ordered node sequence plus the
/// vulnerabilities the traversal crossed. Supplied by the graph collaborator,
/// analyzed (never produced) by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPath {
    pub nodes: Vec<PathNode>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

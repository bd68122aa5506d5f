use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kinds of monitored assets tracked in the external knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Domain,
    Subdomain,
    Ip,
    Service,
    CloudResource,
    Certificate,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain => write!(f, "domain"),
            Self::Subdomain => write!(f, "subdomain"),
            Self::Ip => write!(f, "ip"),
            Self::Service => write!(f, "service"),
            Self::CloudResource => write!(f, "cloud_resource"),
            Self::Certificate => write!(f, "certificate"),
        }
    }
}

/// Business criticality assigned to an asset by its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset operational status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Active,
    Inactive,
    #[default]
    Unknown,
}

/// Network exposure class, derived once from asset tags by the collaborator
/// that supplies snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    InternetFacing,
    Dmz,
    Internal,
    #[default]
    Unknown,
}

impl Exposure {
    /// Derive exposure from free-form asset tags.
    ///
    /// "internet-facing"/"public" win over "dmz", which wins over "internal";
    /// anything else is unknown.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let has = |t: &str| tags.iter().any(|tag| tag.as_ref() == t);
        if has("internet-facing") || has("public") {
            Self::InternetFacing
        } else if has("dmz") {
            Self::Dmz
        } else if has("internal") {
            Self::Internal
        } else {
            Self::Unknown
        }
    }
}

/// A security capability observed on an asset or path node.
///
/// Capability sets are computed once when the collaborator builds the
/// snapshot, so scoring code never re-parses tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Waf,
    Firewall,
    Mfa,
    TwoFactor,
    Edr,
    Ids,
    Monitored,
    Logged,
}

impl Capability {
    /// Map a single tag to a capability, if it names one.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "waf" => Some(Self::Waf),
            "firewall" => Some(Self::Firewall),
            "mfa" => Some(Self::Mfa),
            "2fa" => Some(Self::TwoFactor),
            "edr" => Some(Self::Edr),
            "ids" => Some(Self::Ids),
            "monitored" => Some(Self::Monitored),
            "logged" => Some(Self::Logged),
            _ => None,
        }
    }
}

/// Collect the capability set named by a tag list.
pub fn capabilities_from_tags<S: AsRef<str>>(tags: &[S]) -> BTreeSet<Capability> {
    tags.iter()
        .filter_map(|t| Capability::from_tag(t.as_ref()))
        .collect()
}

/// Read-only snapshot of a monitored asset.
///
/// Owned and persisted by the external graph store; the analytics engine only
/// ever sees immutable copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub value: String,
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub exposure: Exposure,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Ids of vulnerabilities the graph currently links to this asset.
    #[serde(default)]
    pub vulnerability_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl AssetSnapshot {
    pub fn new(id: impl Into<String>, asset_type: AssetType, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset_type,
            value: value.into(),
            criticality: Criticality::Unknown,
            status: AssetStatus::Unknown,
            tags: Vec::new(),
            exposure: Exposure::Unknown,
            ports: Vec::new(),
            services: Vec::new(),
            technologies: Vec::new(),
            vulnerability_ids: Vec::new(),
            discovered: None,
            last_seen: None,
        }
    }

    /// Attach tags and derive the exposure class from them.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.exposure = Exposure::from_tags(&tags);
        self.tags = tags;
        self
    }
}

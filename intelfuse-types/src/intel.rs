use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intelligence collection discipline a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Osint,
    Sigint,
    Cybint,
    Geoint,
    Humint,
    /// Anything that does not map to a known discipline.
    Other,
}

impl SourceType {
    /// Parse a discipline name, falling back to [`SourceType::Other`].
    /// Unknown disciplines are scored with a neutral base, never rejected.
    pub fn parse_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "osint" => Self::Osint,
            "sigint" => Self::Sigint,
            "cybint" => Self::Cybint,
            "geoint" => Self::Geoint,
            "humint" => Self::Humint,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Osint => "osint",
            Self::Sigint => "sigint",
            Self::Cybint => "cybint",
            Self::Geoint => "geoint",
            Self::Humint => "humint",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribution of one intelligence source: its discipline plus an optional
/// per-source reputation. Reputation defaults to 0.8 when the feed does not
/// supply one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<f64>,
}

impl SourceRef {
    pub const DEFAULT_REPUTATION: f64 = 0.8;

    pub fn new(source_type: SourceType) -> Self {
        Self { source_type, reputation: None }
    }

    pub fn with_reputation(source_type: SourceType, reputation: f64) -> Self {
        Self { source_type, reputation: Some(reputation) }
    }

    pub fn reputation_or_default(&self) -> f64 {
        self.reputation.unwrap_or(Self::DEFAULT_REPUTATION)
    }
}

/// Indicator of Compromise categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IocType {
    Ip,
    Domain,
    Url,
    HashMd5,
    HashSha1,
    HashSha256,
    Email,
    Mutex,
    RegistryKey,
}

/// Indicator of Compromise with source attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    #[serde(rename = "type")]
    pub ioc_type: IocType,
    pub value: String,
    /// Feed-supplied confidence, 0.0-1.0.
    pub confidence: f64,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malware_family: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A threat intelligence report as delivered by a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatRecord {
    pub id: String,
    pub source_type: SourceType,
    /// Free-text report body. Vulnerability correlation substring-matches CVE
    /// ids against this field, so it is kept verbatim.
    #[serde(default)]
    pub description: String,
    /// CVE ids the feed attributed explicitly.
    #[serde(default)]
    pub cve_ids: Vec<String>,
    #[serde(default)]
    pub active_exploitation: bool,
    #[serde(default)]
    pub targeted_campaign: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malware_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Caller-supplied threat context for one vulnerability.
///
/// Ephemeral: assembled per request by the threat-context collaborator and
/// passed as `Option<&ThreatContext>`; absence means "no intelligence".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatContext {
    #[serde(default)]
    pub active_exploitation: bool,
    #[serde(default)]
    pub targeted_campaign: bool,
    #[serde(default)]
    pub apt_linked: bool,
    #[serde(default)]
    pub threat_mentions: u32,
    #[serde(default)]
    pub targeting_organization: bool,
    #[serde(default)]
    pub targeting_industry: bool,
    #[serde(default)]
    pub targeting_region: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_parse_lossy() {
        assert_eq!(SourceType::parse_lossy("OSINT"), SourceType::Osint);
        assert_eq!(SourceType::parse_lossy("sigint"), SourceType::Sigint);
        assert_eq!(SourceType::parse_lossy("darkweb"), SourceType::Other);
    }

    #[test]
    fn source_ref_default_reputation() {
        assert_eq!(SourceRef::new(SourceType::Osint).reputation_or_default(), 0.8);
        assert_eq!(
            SourceRef::with_reputation(SourceType::Humint, 0.3).reputation_or_default(),
            0.3
        );
    }

    #[test]
    fn threat_context_defaults_to_no_intel() {
        let ctx = ThreatContext::default();
        assert!(!ctx.active_exploitation);
        assert_eq!(ctx.threat_mentions, 0);
    }
}

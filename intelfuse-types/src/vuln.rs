use crate::score::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far along the exploit ecosystem is for a vulnerability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploitStatus {
    /// Public, reliable exploit code in circulation.
    Weaponized,
    /// Proof of concept exists.
    Poc,
    /// No known exploit.
    Theoretical,
    #[default]
    Unknown,
}

impl ExploitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weaponized => "weaponized",
            Self::Poc => "poc",
            Self::Theoretical => "theoretical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExploitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vulnerability snapshot, usually CVE-shaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub severity: Severity,
    /// CVSS base score, 0.0-10.0.
    pub cvss_score: f64,
    #[serde(default)]
    pub exploit_status: ExploitStatus,
    #[serde(default)]
    pub patch_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
}

impl Vulnerability {
    pub fn new(id: impl Into<String>, cvss_score: f64) -> Self {
        Self {
            id: id.into(),
            severity: Severity::from_score(cvss_score),
            cvss_score,
            exploit_status: ExploitStatus::Unknown,
            patch_available: false,
            published_date: None,
        }
    }

    /// Whether the id follows the `CVE-` naming scheme.
    pub fn is_cve(&self) -> bool {
        self.id.starts_with("CVE-")
    }
}

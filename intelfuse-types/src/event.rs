use crate::intel::SourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generic security event used by temporal correlation and the timeline
/// analytics.
///
/// Events arrive from heterogeneous feeds; a missing or unparseable timestamp
/// is represented as `None` and skipped by time-based operations rather than
/// treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default)]
    pub description: String,
}

impl EventRecord {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp: Some(timestamp),
            source_type: None,
            description: String::new(),
        }
    }

    /// Case-insensitive check whether this event's text references a value.
    /// Used when promoting IOC clusters to campaigns.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.description.to_lowercase().contains(&needle) || self.id.to_lowercase().contains(&needle)
    }
}

/// An entity record carrying location attribution, for spatial correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
}

impl GeoRecord {
    /// Grouping key: country wins over region, region over free-form location.
    pub fn location_key(&self) -> Option<&str> {
        self.country
            .as_deref()
            .or(self.region.as_deref())
            .or(self.location.as_deref())
    }
}

/// A historical attack observation against one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackEvent {
    pub target_asset_id: String,
    pub timestamp: DateTime<Utc>,
}

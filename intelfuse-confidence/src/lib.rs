// ---------------------------------------------------------------------------
// Confidence scoring
// ---------------------------------------------------------------------------
//
// Converts source attribution and intelligence age into [0,1] confidence
// values. Everything here is a total function: unknown disciplines and odd
// timestamps fall back to documented defaults instead of failing.

use chrono::{DateTime, Utc};
use intelfuse_types::{SourceRef, SourceType};
use std::collections::BTreeSet;

/// Default decay horizon for temporal confidence.
pub const DEFAULT_DECAY_DAYS: i64 = 30;

/// Floor below which aged intelligence never drops.
const TEMPORAL_FLOOR: f64 = 0.1;

/// Base confidence per collection discipline.
///
/// Technical disciplines score higher than human reporting; anything
/// unrecognized gets a neutral 0.5.
fn base_confidence(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::Osint => 0.7,
        SourceType::Sigint => 0.85,
        SourceType::Cybint => 0.9,
        SourceType::Geoint => 0.8,
        SourceType::Humint => 0.6,
        SourceType::Other => 0.5,
    }
}

/// Confidence in a single source: the mean of its discipline base and its
/// reputation.
pub fn source_confidence(source_type: SourceType, reputation: f64) -> f64 {
    (base_confidence(source_type) + reputation) / 2.0
}

/// Confidence when multiple sources corroborate the same assessment.
///
/// The first source in the list is the primary and seeds the score. Each
/// further source adds 15% of its own confidence when its discipline differs
/// from the primary's, 5% when it repeats it, clamping to 1.0 after every
/// addition. A diversity bonus of (distinct disciplines - 1) x 0.05 is added
/// last. Input order is significant and must be preserved by callers.
pub fn multi_source_confidence(sources: &[SourceRef]) -> f64 {
    let Some((primary, rest)) = sources.split_first() else {
        return 0.0;
    };

    let mut confidence = source_confidence(primary.source_type, primary.reputation_or_default());
    if rest.is_empty() {
        return confidence;
    }

    for source in rest {
        let own = source_confidence(source.source_type, source.reputation_or_default());
        let boost = if source.source_type != primary.source_type {
            own * 0.15
        } else {
            own * 0.05
        };
        confidence = (confidence + boost).min(1.0);
    }

    let distinct: BTreeSet<SourceType> = sources.iter().map(|s| s.source_type).collect();
    let diversity_bonus = (distinct.len().saturating_sub(1)) as f64 * 0.05;
    (confidence + diversity_bonus).min(1.0)
}

/// Age-based confidence decay.
///
/// Linear decay over `decay_days` whole days, floored at 0.1. Timestamps from
/// the future (negative age) are treated as fresh. Both instants are UTC, so
/// feeds reporting in local offsets must be normalized before they get here;
/// `DateTime<Utc>` makes that the type's problem rather than this function's.
pub fn temporal_confidence(observed: DateTime<Utc>, now: DateTime<Utc>, decay_days: i64) -> f64 {
    let age_days = (now - observed).num_days();
    if age_days < 0 {
        return 1.0;
    }
    let decay_rate = 1.0 / decay_days as f64;
    (1.0 - age_days as f64 * decay_rate).max(TEMPORAL_FLOOR)
}

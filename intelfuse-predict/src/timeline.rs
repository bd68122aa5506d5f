// ---------------------------------------------------------------------------
// Timelines
// ---------------------------------------------------------------------------

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Bucket items into calendar-day (UTC) counts, ordered ascending.
///
/// The selector picks the timestamp to bucket on; items where it returns
/// `None` are skipped, never an error.
pub fn build_timeline<T>(
    items: &[T],
    pick: impl Fn(&T) -> Option<DateTime<Utc>>,
) -> BTreeMap<NaiveDate, usize> {
    let mut timeline = BTreeMap::new();
    for item in items {
        if let Some(ts) = pick(item) {
            *timeline.entry(ts.date_naive()).or_default() += 1;
        }
    }
    timeline
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 for fewer than two
/// values.
pub(crate) fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

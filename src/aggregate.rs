use crate::types::{AggregateStat, ObservationEntry, ObservationTable};
use tracing::debug;

/// Fold every entry filed under one canonical key into a single weighted
/// statistic.
///
/// - `(avg, n)` with `n > 0` adds `avg * n` to the sum and `n` to the weight.
/// - `(avg, 0)` counts as one unweighted sample.
/// - entries without an average contribute nothing.
///
/// The reported weight saturates at `u64::MAX`; the mean is divided by the
/// unsaturated total.
///
/// With zero total weight the first entry carrying an average is surfaced
/// with weight 0; with none at all the result has no average.
pub fn aggregate(canonical_key: &str, entries: &[ObservationEntry]) -> AggregateStat {
    let mut weighted_sum = 0.0;
    let mut divisor = 0.0;
    let mut weight = 0u64;
    let mut display_name = entries
        .first()
        .map(|e| e.display_name.clone())
        .unwrap_or_default();

    for e in entries {
        let Some(avg) = e.average else { continue };
        if e.sample_count == 0 {
            weighted_sum += avg;
            divisor += 1.0;
            weight = weight.saturating_add(1);
            continue;
        }
        weighted_sum += avg * e.sample_count as f64;
        divisor += e.sample_count as f64;
        weight = weight.saturating_add(e.sample_count);
        // latest casing that carried real weight
        display_name = e.display_name.clone();
    }

    let average = if weight > 0 {
        Some(weighted_sum / divisor)
    } else {
        let fallback = entries.iter().find(|e| e.average.is_some());
        if let Some(e) = fallback {
            display_name = e.display_name.clone();
        }
        debug!(key = canonical_key, found = fallback.is_some(), "zero-weight fallback");
        fallback.and_then(|e| e.average)
    };

    AggregateStat {
        canonical_key: canonical_key.to_string(),
        display_name,
        average,
        weight,
    }
}

/// Aggregate every key of the table, in first-seen key order.
pub fn aggregate_table(table: &ObservationTable) -> Vec<AggregateStat> {
    table.iter().map(|(key, entries)| aggregate(key, entries)).collect()
}

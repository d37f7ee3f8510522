//! Join merged crops against their reference thresholds and rank the ones
//! that meet demand.

use crate::aggregate::aggregate_table;
use crate::merge::merge_equivalents;
use crate::types::{MergedDemandRecord, ObservationTable, RankedResult, ThresholdTable};
use std::cmp::Ordering;
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 10;

/// Threshold for a merged crop: the representative key (the first key that
/// carried data) first, then the remaining keys in the order they were merged.
fn threshold_for(record: &MergedDemandRecord, thresholds: &ThresholdTable) -> Option<f64> {
    record
        .canonical_keys
        .iter()
        .find_map(|key| thresholds.get(key))
}

/// Every merged crop whose average is at or above its threshold, sorted by
/// average descending. The sort is stable, so ties keep merger order.
pub fn rank_matches(
    merged: &[MergedDemandRecord],
    thresholds: &ThresholdTable,
) -> Vec<RankedResult> {
    let mut matched: Vec<RankedResult> = Vec::new();
    for record in merged {
        let Some(avg) = record.weighted_average else {
            continue;
        };
        let Some(threshold) = threshold_for(record, thresholds) else {
            debug!(key = ?record.representative_key(), "no threshold for crop");
            continue;
        };
        if avg >= threshold {
            matched.push(RankedResult {
                display_name: record.display_name.clone(),
                observed_value: avg,
                threshold_value: threshold,
            });
        }
    }
    matched.sort_by(|a, b| {
        b.observed_value
            .partial_cmp(&a.observed_value)
            .unwrap_or(Ordering::Equal)
    });
    matched
}

pub fn rank_top_n(
    merged: &[MergedDemandRecord],
    thresholds: &ThresholdTable,
    n: usize,
) -> Vec<RankedResult> {
    let mut ranked = rank_matches(merged, thresholds);
    ranked.truncate(n);
    ranked
}

/// Aggregate, merge and rank in one call.
pub fn compute_top_n(
    observations: &ObservationTable,
    thresholds: &ThresholdTable,
    n: usize,
) -> Vec<RankedResult> {
    let merged = merge_equivalents(aggregate_table(observations));
    rank_top_n(&merged, thresholds, n)
}

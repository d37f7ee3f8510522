use crate::aggregate::aggregate_table;
use crate::merge::merge_equivalents;
use crate::rank::rank_matches;
use crate::types::{
    DayAverage, DayAverageRow, DemandSummary, ObservationTable, RankedResult, ThresholdTable,
    TopDemandRow,
};
use crate::util::format_fixed;
use chrono::Utc;
use tracing::info;

pub struct TopDemandReport {
    pub ranked: Vec<RankedResult>,
    pub rows: Vec<TopDemandRow>,
    pub summary: DemandSummary,
}

/// `day_averages.csv` rows: six decimals, blank average when a crop had no
/// usable samples.
pub fn day_average_rows(averages: &[DayAverage]) -> Vec<DayAverageRow> {
    averages
        .iter()
        .map(|a| DayAverageRow {
            crop: a.crop.clone(),
            average: a.average.map(|v| format_fixed(v, 6)).unwrap_or_default(),
            count: a.count,
        })
        .collect()
}

pub fn top_demand_rows(ranked: &[RankedResult]) -> Vec<TopDemandRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, r)| TopDemandRow {
            rank: idx + 1,
            crop: r.display_name.clone(),
            daily_average: format_fixed(r.observed_value, 6),
            peak_threshold: format_fixed(r.threshold_value, 6),
        })
        .collect()
}

/// Run the ranking pipeline and package its output for writing.
pub fn generate_top_demand(
    observations: &ObservationTable,
    thresholds: &ThresholdTable,
    top_n: usize,
) -> TopDemandReport {
    let merged = merge_equivalents(aggregate_table(observations));
    let mut ranked = rank_matches(&merged, thresholds);
    let crops_meeting_threshold = ranked.len();
    ranked.truncate(top_n);

    info!(
        keys = observations.len(),
        merged = merged.len(),
        meeting = crops_meeting_threshold,
        reported = ranked.len(),
        "ranked crops by demand"
    );

    let summary = DemandSummary {
        generated_at: Utc::now().to_rfc3339(),
        observation_rows: observations.entry_count(),
        canonical_keys: observations.len(),
        merged_crops: merged.len(),
        threshold_records: thresholds.len(),
        crops_meeting_threshold,
        top_n,
        reported: ranked.len(),
    };
    let rows = top_demand_rows(&ranked);
    TopDemandReport {
        ranked,
        rows,
        summary,
    }
}

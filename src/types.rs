use crate::normalize::canonical_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;

/// One row of `day_averages.csv` as it comes off the reader. Every field is
/// kept as text so bad cells can be downgraded instead of failing the row.
#[derive(Debug, Deserialize)]
pub struct RawObservationRow {
    #[serde(alias = "Crop")]
    pub crop: Option<String>,
    pub average: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawThresholdRow {
    #[serde(rename = "Crop", alias = "crop")]
    pub crop: Option<String>,
    #[serde(rename = "Average_Peak_Value", alias = "average_peak_value")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationEntry {
    pub display_name: String,
    pub average: Option<f64>,
    pub sample_count: u64,
}

impl ObservationEntry {
    pub fn new(display_name: impl Into<String>, average: Option<f64>, sample_count: u64) -> Self {
        Self {
            display_name: display_name.into(),
            average,
            sample_count,
        }
    }
}

/// Daily observations grouped by canonical key.
///
/// Keys iterate in the order they were first seen and entries keep their
/// insertion order, since both the aggregated display name and the merge
/// representative depend on it.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    order: Vec<String>,
    groups: HashMap<String, Vec<ObservationEntry>>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the entry under the canonical key of its display name.
    /// Returns `false` (and drops the entry) when the name is blank.
    pub fn push(&mut self, entry: ObservationEntry) -> bool {
        let Some(key) = canonical_key(&entry.display_name) else {
            return false;
        };
        match self.groups.get_mut(&key) {
            Some(group) => group.push(entry),
            None => {
                self.order.push(key.clone());
                self.groups.insert(key, vec![entry]);
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ObservationEntry])> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.groups.get(k).map(|g| (k.as_str(), g.as_slice())))
    }

    pub fn get(&self, key: &str) -> Option<&[ObservationEntry]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of canonical keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl FromIterator<ObservationEntry> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = ObservationEntry>>(iter: I) -> Self {
        let mut table = ObservationTable::new();
        for entry in iter {
            table.push(entry);
        }
        table
    }
}

/// Reference thresholds keyed by canonical key. A later insert for the same
/// key replaces the earlier value.
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    values: HashMap<String, f64>,
}

impl ThresholdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, crop: &str, value: f64) -> bool {
        match canonical_key(crop) {
            Some(key) => {
                self.values.insert(key, value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ThresholdTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut table = ThresholdTable::new();
        for (crop, value) in iter {
            table.insert(crop, value);
        }
        table
    }
}

/// Result of folding every entry of one canonical key together.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStat {
    pub canonical_key: String,
    pub display_name: String,
    pub average: Option<f64>,
    pub weight: u64,
}

/// One real-world crop after letter-order variants have been folded
/// together. The first of `canonical_keys` is the representative; the rest
/// were absorbed in the order listed.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDemandRecord {
    pub display_name: String,
    pub weighted_average: Option<f64>,
    pub total_weight: u64,
    pub canonical_keys: Vec<String>,
}

impl MergedDemandRecord {
    /// `None` only for a hand-built record with no keys.
    pub fn representative_key(&self) -> Option<&str> {
        self.canonical_keys.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub display_name: String,
    pub observed_value: f64,
    pub threshold_value: f64,
}

/// Per-crop mean of a `Day.csv` series.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAverage {
    pub crop: String,
    pub average: Option<f64>,
    pub count: usize,
}

/// Per-crop mean of a `Year.csv` series, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct PeakValueRow {
    #[serde(rename = "Crop")]
    #[tabled(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Average_Peak_Value")]
    #[tabled(rename = "Average_Peak_Value")]
    pub average_peak_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCrop {
    pub crop: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PeakCollection {
    pub rows: Vec<PeakValueRow>,
    pub skipped: Vec<SkippedCrop>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DayAverageRow {
    pub crop: String,
    pub average: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopDemandRow {
    #[tabled(rename = "Rank")]
    #[serde(skip)]
    pub rank: usize,
    #[tabled(rename = "Crop")]
    pub crop: String,
    #[tabled(rename = "DailyAverage")]
    pub daily_average: String,
    #[tabled(rename = "PeakThreshold")]
    pub peak_threshold: String,
}

#[derive(Debug, Serialize)]
pub struct DemandSummary {
    pub generated_at: String,
    pub observation_rows: usize,
    pub canonical_keys: usize,
    pub merged_crops: usize,
    pub threshold_records: usize,
    pub crops_meeting_threshold: usize,
    pub top_n: usize,
    pub reported: usize,
}

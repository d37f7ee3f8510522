use crate::normalize::equivalence_signature;
use crate::types::{AggregateStat, MergedDemandRecord};
use std::collections::HashMap;
use tracing::debug;

/// Weighted combination of two `(average, weight)` pairs.
///
/// While the combined weight is positive a missing average counts as `0.0`,
/// which drags the result down rather than being excluded. With zero total
/// weight the left side's average wins if it has one.
pub fn combine(
    left: (Option<f64>, u64),
    right: (Option<f64>, u64),
) -> (Option<f64>, u64) {
    let (avg_a, w_a) = left;
    let (avg_b, w_b) = right;
    let total = w_a.saturating_add(w_b);
    if total == 0 || (avg_a.is_none() && avg_b.is_none()) {
        return (avg_a.or(avg_b), total);
    }
    let sum = avg_a.unwrap_or(0.0) * w_a as f64 + avg_b.unwrap_or(0.0) * w_b as f64;
    // unsaturated divisor
    (Some(sum / (w_a as f64 + w_b as f64)), total)
}

impl MergedDemandRecord {
    fn from_stat(stat: AggregateStat) -> Self {
        Self {
            display_name: stat.display_name,
            weighted_average: stat.average,
            total_weight: stat.weight,
            canonical_keys: vec![stat.canonical_key],
        }
    }

    /// Fold another canonical key's statistic into this record. The absorbed
    /// key's display name replaces the current one.
    ///
    /// A representative without an average never supplied data, so the
    /// first absorbed key that has one takes its place at the front of
    /// `canonical_keys`.
    pub fn absorb(&mut self, stat: AggregateStat) {
        let promote = self.weighted_average.is_none() && stat.average.is_some();
        let (average, weight) = combine(
            (self.weighted_average, self.total_weight),
            (stat.average, stat.weight),
        );
        self.weighted_average = average;
        self.total_weight = weight;
        self.display_name = stat.display_name;
        if promote {
            self.canonical_keys.insert(0, stat.canonical_key);
        } else {
            self.canonical_keys.push(stat.canonical_key);
        }
    }
}

/// Collapse canonical keys that are letter-order variants of each other.
///
/// Output order follows the first appearance of each signature; the first
/// key with a signature and an average is the representative of its group.
pub fn merge_equivalents(stats: Vec<AggregateStat>) -> Vec<MergedDemandRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<MergedDemandRecord> = Vec::new();

    for stat in stats {
        let signature = equivalence_signature(&stat.canonical_key);
        match index.get(&signature) {
            Some(&i) => {
                debug!(
                    key = %stat.canonical_key,
                    into = ?merged[i].representative_key(),
                    "merging equivalent crop key"
                );
                merged[i].absorb(stat);
            }
            None => {
                index.insert(signature, merged.len());
                merged.push(MergedDemandRecord::from_stat(stat));
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stat(key: &str, name: &str, avg: Option<f64>, weight: u64) -> AggregateStat {
        AggregateStat {
            canonical_key: key.to_string(),
            display_name: name.to_string(),
            average: avg,
            weight,
        }
    }

    #[test]
    fn anagram_keys_merge_with_weights() {
        let merged = merge_equivalents(vec![
            stat("jowar", "Jowar", Some(50.0), 4),
            stat("jawor", "jawor", Some(70.0), 6),
        ]);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_relative_eq!(m.weighted_average.unwrap(), 62.0);
        assert_eq!(m.total_weight, 10);
        assert_eq!(m.display_name, "jawor");
        assert_eq!(m.canonical_keys, vec!["jowar", "jawor"]);
        assert_eq!(m.representative_key(), Some("jowar"));
    }

    #[test]
    fn merging_a_record_with_itself_doubles_weight() {
        assert_eq!(combine((Some(10.0), 5), (Some(10.0), 5)), (Some(10.0), 10));
    }

    #[test]
    fn combined_weight_saturates() {
        let (avg, w) = combine((Some(10.0), u64::MAX), (Some(10.0), u64::MAX));
        assert_eq!(w, u64::MAX);
        assert_relative_eq!(avg.unwrap(), 10.0);
    }

    #[test]
    fn absent_average_counts_as_zero_when_weighted() {
        let (avg, w) = combine((None, 2), (Some(30.0), 2));
        assert_relative_eq!(avg.unwrap(), 15.0);
        assert_eq!(w, 4);
    }

    #[test]
    fn zero_weights_prefer_existing_average() {
        assert_eq!(combine((Some(1.0), 0), (Some(2.0), 0)), (Some(1.0), 0));
        assert_eq!(combine((None, 0), (Some(2.0), 0)), (Some(2.0), 0));
        assert_eq!(combine((Some(0.0), 0), (Some(2.0), 0)), (Some(0.0), 0));
        assert_eq!(combine((None, 0), (None, 0)), (None, 0));
    }

    #[test]
    fn distinct_signatures_stay_apart_in_first_seen_order() {
        let merged = merge_equivalents(vec![
            stat("rice", "Rice", Some(1.0), 1),
            stat("wheat", "Wheat", Some(2.0), 1),
            stat("icer", "ICER", Some(3.0), 1),
        ]);
        let names: Vec<_> = merged.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["ICER", "Wheat"]);
        assert_eq!(merged[0].canonical_keys, vec!["rice", "icer"]);
    }

    #[test]
    fn key_without_data_yields_representative_role() {
        let merged = merge_equivalents(vec![
            stat("jawor", "Jawor", None, 0),
            stat("jowar", "Jowar", Some(62.0), 10),
            stat("rowaj", "Rowaj", Some(62.0), 10),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].canonical_keys, vec!["jowar", "jawor", "rowaj"]);
        assert_eq!(merged[0].representative_key(), Some("jowar"));
        assert_relative_eq!(merged[0].weighted_average.unwrap(), 62.0);
        assert_eq!(merged[0].total_weight, 20);
    }

    #[test]
    fn grouping_is_order_independent_but_name_and_average_are_not() {
        let stats = vec![
            stat("jowar", "Jowar", Some(40.0), 0),
            stat("jawor", "jawor", Some(70.0), 0),
            stat("rice", "Rice", Some(5.0), 2),
        ];
        let forward = merge_equivalents(stats.clone());
        let backward = merge_equivalents(stats.into_iter().rev().collect());

        let groups = |merged: &[MergedDemandRecord]| {
            let mut g: Vec<Vec<String>> = merged
                .iter()
                .map(|m| {
                    let mut keys = m.canonical_keys.clone();
                    keys.sort();
                    keys
                })
                .collect();
            g.sort();
            g
        };
        assert_eq!(groups(&forward), groups(&backward));

        let fwd = forward.iter().find(|m| m.canonical_keys.len() == 2).unwrap();
        let bwd = backward.iter().find(|m| m.canonical_keys.len() == 2).unwrap();
        assert_eq!(fwd.display_name, "jawor");
        assert_eq!(bwd.display_name, "Jowar");
        assert_eq!(fwd.weighted_average, Some(40.0));
        assert_eq!(bwd.weighted_average, Some(70.0));
    }

    #[test]
    fn chains_collapse_into_one_entity() {
        let merged = merge_equivalents(vec![
            stat("onion", "Onion", Some(10.0), 1),
            stat("noino", "Noino", Some(20.0), 1),
            stat("nonio", "Nonio", Some(30.0), 1),
        ]);
        assert_eq!(merged.len(), 1);
        assert_relative_eq!(merged[0].weighted_average.unwrap(), 20.0);
        assert_eq!(merged[0].total_weight, 3);
    }
}

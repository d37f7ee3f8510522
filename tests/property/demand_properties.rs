use crop_demand::aggregate::aggregate;
use crop_demand::merge::merge_equivalents;
use crop_demand::normalize::equivalence_signature;
use crop_demand::rank::rank_top_n;
use crop_demand::{AggregateStat, MergedDemandRecord, ObservationEntry, ThresholdTable};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn entry_strategy() -> impl Strategy<Value = ObservationEntry> {
    (
        prop::option::of(0.0f64..10_000.0),
        0u64..50,
    )
        .prop_map(|(avg, count)| ObservationEntry::new("crop", avg, count))
}

fn stat_strategy() -> impl Strategy<Value = AggregateStat> {
    ("[abc]{1,4}", 1.0f64..1_000.0, 1u64..20).prop_map(|(key, avg, weight)| AggregateStat {
        display_name: key.to_uppercase(),
        canonical_key: key,
        average: Some(avg),
        weight,
    })
}

/// Merge groups as sets of member keys, ignoring order.
fn membership(merged: &[MergedDemandRecord]) -> BTreeSet<BTreeSet<String>> {
    merged
        .iter()
        .map(|m| m.canonical_keys.iter().cloned().collect())
        .collect()
}

fn dedup_keys(stats: Vec<AggregateStat>) -> Vec<AggregateStat> {
    let mut seen = BTreeSet::new();
    stats
        .into_iter()
        .filter(|s| seen.insert(s.canonical_key.clone()))
        .collect()
}

// ── Weighted mean stays within the contributing averages ─────────────────

proptest! {
    #[test]
    fn aggregate_is_bounded(entries in prop::collection::vec(entry_strategy(), 1..20)) {
        let stat = aggregate("crop", &entries);
        let present: Vec<f64> = entries.iter().filter_map(|e| e.average).collect();
        if stat.weight > 0 {
            let lo = present.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = present.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let avg = stat.average.unwrap();
            prop_assert!(avg >= lo - 1e-9 && avg <= hi + 1e-9, "{} not in [{}, {}]", avg, lo, hi);
        } else {
            prop_assert!(present.is_empty());
            prop_assert_eq!(stat.average, None);
        }
    }
}

// ── Merge membership does not depend on discovery order ──────────────────

proptest! {
    #[test]
    fn merge_membership_is_order_independent(
        stats in prop::collection::vec(stat_strategy(), 1..12)
    ) {
        let stats = dedup_keys(stats);
        let forward = merge_equivalents(stats.clone());
        let mut reversed_input = stats.clone();
        reversed_input.reverse();
        let backward = merge_equivalents(reversed_input);

        prop_assert_eq!(membership(&forward), membership(&backward));

        for m in &forward {
            let sig = equivalence_signature(m.representative_key().unwrap());
            prop_assert!(m.canonical_keys.iter().all(|k| equivalence_signature(k) == sig));
            let weight: u64 = stats
                .iter()
                .filter(|s| equivalence_signature(&s.canonical_key) == sig)
                .map(|s| s.weight)
                .sum();
            prop_assert_eq!(m.total_weight, weight);
        }
    }

    #[test]
    fn self_merge_keeps_average_and_doubles_weight(avg in 0.0f64..1_000.0, w in 1u64..100) {
        let stat = AggregateStat {
            canonical_key: "onion".into(),
            display_name: "Onion".into(),
            average: Some(avg),
            weight: w,
        };
        let merged = merge_equivalents(vec![stat.clone(), AggregateStat {
            canonical_key: "noino".into(),
            ..stat
        }]);
        prop_assert_eq!(merged.len(), 1);
        prop_assert_eq!(merged[0].total_weight, 2 * w);
        prop_assert!((merged[0].weighted_average.unwrap() - avg).abs() <= 1e-9 * avg.max(1.0));
    }
}

// ── Ranking bounds and ordering ──────────────────────────────────────────

proptest! {
    #[test]
    fn ranking_is_bounded_sorted_and_stable(
        values in prop::collection::vec((0u8..20, 0u8..20), 0..30),
        n in 0usize..15,
    ) {
        let merged: Vec<MergedDemandRecord> = values
            .iter()
            .enumerate()
            .map(|(i, (avg, _))| MergedDemandRecord {
                display_name: format!("crop{i}"),
                weighted_average: Some(f64::from(*avg)),
                total_weight: 1,
                canonical_keys: vec![format!("crop{i}")],
            })
            .collect();
        let keys: Vec<String> = (0..values.len()).map(|i| format!("crop{i}")).collect();
        let thresholds: ThresholdTable = keys
            .iter()
            .zip(values.iter())
            .map(|(k, (_, thr))| (k.as_str(), f64::from(*thr)))
            .collect();

        let ranked = rank_top_n(&merged, &thresholds, n);
        prop_assert!(ranked.len() <= n);
        for r in &ranked {
            prop_assert!(r.observed_value >= r.threshold_value);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].observed_value >= pair[1].observed_value);
            if pair[0].observed_value == pair[1].observed_value {
                let idx = |name: &str| name.trim_start_matches("crop").parse::<usize>().unwrap();
                prop_assert!(idx(&pair[0].display_name) < idx(&pair[1].display_name));
            }
        }
    }
}

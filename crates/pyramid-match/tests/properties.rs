// Property-based tests for threshold, idempotence and row partitioning.
// CI: 64 cases. Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};
use proptest::prelude::*;

use pyramid_match::frame::column_strings;
use pyramid_match::{Candidates, FuzzyMatcher, Matcher, PyramidMatcher};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[A-Z]{3,10}",
        1 => r"[A-Z]{2,6} [A-Z]{2,6}",
    ]
}

fn arb_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(arb_name(), 1..8)
}

fn single_level(names: &BTreeSet<String>) -> DataFrame {
    let values: Vec<Option<String>> = names.iter().cloned().map(Some).collect();
    DataFrame::new(vec![Column::new("level_1_name".into(), values)]).unwrap()
}

fn names_in(df: &DataFrame, column: &str) -> BTreeSet<String> {
    column_strings(df, column)
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn acceptance_is_monotone_in_threshold(
        query in arb_name(),
        choice in arb_name(),
        low in 0.0..=100.0f64,
        high in 0.0..=100.0f64,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let candidates: Candidates = [(choice, Vec::new())].into_iter().collect();
        let strict = FuzzyMatcher::new(high, "wratio").unwrap();
        let lenient = FuzzyMatcher::new(low, "wratio").unwrap();

        if strict.get_similarity(&query, &candidates).unwrap().is_some() {
            prop_assert!(lenient.get_similarity(&query, &candidates).unwrap().is_some());
        }
    }

    #[test]
    fn identical_pyramids_match_completely(names in arb_names()) {
        let table = single_level(&names);
        let output = PyramidMatcher::default().run_matching(&table, &table).unwrap();

        prop_assert_eq!(output.full.height(), names.len());
        prop_assert_eq!(output.unmatched_reference.height(), 0);
        prop_assert_eq!(output.unmatched_candidate.height(), 0);
        let inputs = column_strings(&output.full, "input_level_1_name").unwrap();
        let targets = column_strings(&output.full, "target_level_1_name").unwrap();
        prop_assert_eq!(inputs, targets);
    }

    #[test]
    fn every_row_is_matched_or_unmatched_once(
        reference_names in arb_names(),
        candidate_names in arb_names(),
    ) {
        let reference = single_level(&reference_names);
        let candidate = single_level(&candidate_names);
        let output = PyramidMatcher::default().run_matching(&reference, &candidate).unwrap();

        let matched_inputs = names_in(&output.full, "input_level_1_name");
        let unmatched_inputs = names_in(&output.unmatched_candidate, "level_1_name");
        prop_assert!(matched_inputs.is_disjoint(&unmatched_inputs));
        prop_assert_eq!(
            matched_inputs.union(&unmatched_inputs).cloned().collect::<BTreeSet<_>>(),
            candidate_names
        );

        let matched_targets = names_in(&output.full, "target_level_1_name");
        let unmatched_targets = names_in(&output.unmatched_reference, "level_1_name");
        prop_assert!(matched_targets.is_disjoint(&unmatched_targets));
        prop_assert_eq!(
            matched_targets.union(&unmatched_targets).cloned().collect::<BTreeSet<_>>(),
            reference_names
        );
    }
}

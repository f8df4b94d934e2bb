//! Property-based tests for the sorted name index
//!
//! Invariants that hold for any shard layout:
//! - Merge: the merged index is the sorted, deduplicated union of the shards
//! - Range: binary-search ranges select exactly what a linear filter selects
//! - Resolution: a prefix criteria over a generated corpus matches the filter

#[path = "../common/mod.rs"]
mod common;

use codegraph_resolver::features::corpus::sorted::{
    contains, exact_range, merge_shards, prefix_range,
};
use codegraph_resolver::prelude::*;
use common::*;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,2}\\.[A-D][a-z]{0,3}"
}

fn shard_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(name_strategy(), 0..20), 0..6)
}

fn sorted_shard(names: &[String]) -> Vec<Arc<str>> {
    let set: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    set.into_iter().map(Arc::from).collect()
}

fn expected_union(shards: &[Vec<String>]) -> Vec<Arc<str>> {
    let set: BTreeSet<&str> = shards.iter().flatten().map(String::as_str).collect();
    set.into_iter().map(Arc::from).collect()
}

proptest! {
    #[test]
    fn prop_merge_is_sorted_union(shards in shard_strategy()) {
        let merged = merge_shards(shards.iter().map(|s| sorted_shard(s)).collect());
        prop_assert_eq!(merged, expected_union(&shards));
    }

    #[test]
    fn prop_prefix_range_matches_filter(shards in shard_strategy(), prefix in "[a-c]{0,2}\\.?[A-D]?") {
        let names = merge_shards(shards.iter().map(|s| sorted_shard(s)).collect());
        let range = prefix_range(&names, &prefix);
        let expected: Vec<&Arc<str>> = names.iter().filter(|n| n.starts_with(prefix.as_str())).collect();
        let selected: Vec<&Arc<str>> = names[range].iter().collect();
        prop_assert_eq!(selected, expected);
    }

    #[test]
    fn prop_exact_lookup_matches_linear_search(shards in shard_strategy(), probe in name_strategy()) {
        let names = merge_shards(shards.iter().map(|s| sorted_shard(s)).collect());
        let linear = names.iter().any(|n| **n == *probe);
        prop_assert_eq!(contains(&names, &probe), linear);
        prop_assert_eq!(exact_range(&names, &probe).len(), usize::from(linear));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_prefix_criteria_matches_filter(n in 1usize..200, shards in 1usize..5, package in 0usize..8) {
        let corpus: Arc<dyn EntityCorpus> = Arc::new(ShardedCorpus::new(fixture_large_provider(n, shards)));
        let expected: Vec<String> = corpus
            .sorted_names()
            .iter()
            .filter(|name| name.starts_with(&format!("pkg{}.", package)))
            .map(|name| name.to_string())
            .collect();

        let session = ResolutionSession::new(corpus, fixture_config()).unwrap();
        let set = session
            .types(TypeCriteria::new().name(NamePattern::prefix(format!("pkg{}.", package))))
            .unwrap();
        set.on_miss(|| {});
        session.resolve_blocking().unwrap();

        let found: Vec<String> = set
            .value()
            .map(|types| types.iter().map(|t| t.name().to_string()).collect())
            .unwrap_or_default();
        prop_assert_eq!(found, expected);
    }
}

#[test]
fn test_large_corpus_first_match_is_lowest_name() {
    let corpus: Arc<dyn EntityCorpus> = Arc::new(ShardedCorpus::new(fixture_large_provider(5_000, 8)));
    let session = ResolutionSession::new(corpus, fixture_config()).unwrap();
    let first_public = session
        .first_type(TypeCriteria::new().is_public(true).key("first.public"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    // pkg0.Type00000 is public (index 0) and sorts first
    assert_eq!(first_public.value(), Some(TypeEntity::new("pkg0.Type00000")));
    assert_eq!(report.candidates_tested, 1);
}

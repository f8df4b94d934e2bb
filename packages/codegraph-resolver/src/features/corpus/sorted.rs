//! Sorted name index operations
//!
//! The corpus name index is the linear merge of individually pre-sorted
//! shards. Range selection over it is a pair of binary searches.

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

/// Merge two sorted, deduplicated sequences into one, dropping duplicates
pub fn merge_sorted(left: &[Arc<str>], right: &[Arc<str>]) -> Vec<Arc<str>> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            Ordering::Less => {
                push_dedup(&mut out, &left[i]);
                i += 1;
            }
            Ordering::Greater => {
                push_dedup(&mut out, &right[j]);
                j += 1;
            }
            Ordering::Equal => {
                push_dedup(&mut out, &left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    for name in &left[i..] {
        push_dedup(&mut out, name);
    }
    for name in &right[j..] {
        push_dedup(&mut out, name);
    }
    out
}

fn push_dedup(out: &mut Vec<Arc<str>>, name: &Arc<str>) {
    if out.last().map_or(true, |last| last != name) {
        out.push(name.clone());
    }
}

/// Merge any number of pre-sorted shards
///
/// Shards are merged pairwise so each name is touched O(log k) times.
pub fn merge_shards(mut shards: Vec<Vec<Arc<str>>>) -> Vec<Arc<str>> {
    if shards.is_empty() {
        return Vec::new();
    }
    while shards.len() > 1 {
        let mut next = Vec::with_capacity(shards.len().div_ceil(2));
        let mut iter = shards.into_iter();
        while let Some(left) = iter.next() {
            match iter.next() {
                Some(right) => next.push(merge_sorted(&left, &right)),
                None => next.push(left),
            }
        }
        shards = next;
    }
    let mut only = shards.pop().unwrap_or_default();
    only.dedup();
    only
}

/// First index whose name is `>= key`
pub fn lower_bound(names: &[Arc<str>], key: &str) -> usize {
    names.partition_point(|name| &**name < key)
}

/// Index range holding exactly `name` (empty or one slot)
pub fn exact_range(names: &[Arc<str>], name: &str) -> Range<usize> {
    let low = lower_bound(names, name);
    if names.get(low).map_or(false, |n| &**n == name) {
        low..low + 1
    } else {
        low..low
    }
}

/// Index range of every name starting with `prefix`
///
/// Names sharing a prefix are contiguous in sorted order, so the upper
/// bound is a second binary search inside the tail.
pub fn prefix_range(names: &[Arc<str>], prefix: &str) -> Range<usize> {
    let low = lower_bound(names, prefix);
    let len = names[low..].partition_point(|name| name.starts_with(prefix));
    low..low + len
}

pub fn contains(names: &[Arc<str>], name: &str) -> bool {
    !exact_range(names, name).is_empty()
}

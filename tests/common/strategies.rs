#![allow(dead_code)]

use proptest::prelude::*;
use std::collections::BTreeSet;

/// Submission ids as produced upstream: short lowercase tokens
pub fn submission_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{4,12}"
}

/// A batch's worth of distinct submission ids
pub fn submission_ids_strategy(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(submission_id_strategy(), 1..=max)
}

/// (max batch size, number of dispatched submissions)
pub fn batch_fill_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=6, 0usize..=20)
}

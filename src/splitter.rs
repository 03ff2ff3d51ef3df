//! Deterministic dataset splitting
//!
//! Partitions a dataset into two disjoint, order-preserving halves. The
//! split point is `len / 2`, bumped by one with probability 0.5 when the
//! length is odd, drawn from a generator seeded with the session seed.
//! Every strategy run in one comparison session uses the same seed, so all
//! strategies act on an identical partition.

use crate::dataset::{Dataset, Record};

/// The computed partition boundary for a dataset of `total` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPlan {
    pub split_point: usize,
    pub total: usize,
}

/// Compute the split point for a dataset of `total` records.
///
/// Deterministic for a given `(total, seed)` pair. The generator instance
/// is created here and used for exactly one coin flip, so no split
/// decision can perturb any other seeded decision in the run.
pub fn plan_split(total: usize, seed: u64) -> SplitPlan {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut split_point = total / 2;
    if total % 2 != 0 && rng.f32() < 0.5 {
        split_point += 1;
    }
    SplitPlan { split_point, total }
}

/// Split a dataset into partitions A and B.
///
/// Returns borrowed, order-preserving slices; the input is never mutated
/// and the concatenation of the two slices is the original sequence.
pub fn split(dataset: &Dataset, seed: u64) -> (&[Record], &[Record]) {
    let plan = plan_split(dataset.len(), seed);
    dataset.rows().split_at(plan.split_point)
}

//! Seeded random partitioning of a data set.

use continuum_core::{ContinuumError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::dataset::OperatorDataset;

/// Randomly partition `dataset` into two data sets of `round(fraction * n)`
/// and `n - round(fraction * n)` observations.
///
/// Whole observations are moved, so an observation's x, u, y and v always
/// land in the same partition. Both partitions keep the source transforms.
/// The same `seed` always gives the same partition.
pub fn split(dataset: &OperatorDataset, fraction: f64, seed: u64) -> Result<(OperatorDataset, OperatorDataset)> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(ContinuumError::InvalidArgument(format!(
            "split fraction must lie in (0, 1), got {fraction}"
        )));
    }

    let n = dataset.len();
    let first_len = (fraction * n as f64).round() as usize;
    if first_len == 0 || first_len == n {
        return Err(ContinuumError::InvalidArgument(format!(
            "split fraction {fraction} of {n} observations leaves a partition empty"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (first, second) = indices.split_at(first_len);
    debug!(first = first.len(), second = second.len(), seed, "data set split");
    Ok((dataset.subset(first)?, dataset.subset(second)?))
}

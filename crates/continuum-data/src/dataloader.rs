//! OperatorDataLoader — batched iteration over an `OperatorDataset`.

use std::cell::Cell;

use continuum_core::{ContinuumError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::{OperatorBatch, OperatorDataset};

/// Yields [`OperatorBatch`]es with a leading batch axis.
///
/// # Example (Rust)
/// ```ignore
/// use continuum_data::{OperatorDataLoader, Sine};
///
/// let sine = Sine::new(32, 100)?;
/// let loader = OperatorDataLoader::new(sine.into_dataset(), 16, true, false, Some(42))?;
///
/// for batch in loader.iter() {
///     let batch = batch?;
///     // batch.x: [16, 32, 1], batch.u: [16, 32, 1]
/// }
/// ```
pub struct OperatorDataLoader {
    dataset: OperatorDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
    epoch_counter: Cell<u64>,
}

impl OperatorDataLoader {
    /// - `batch_size`: observations per batch, must be positive
    /// - `shuffle`: whether to shuffle indices each epoch
    /// - `drop_last`: if true, drop the last incomplete batch
    /// - `seed`: optional RNG seed for reproducible shuffling
    pub fn new(
        dataset: OperatorDataset,
        batch_size: usize,
        shuffle: bool,
        drop_last: bool,
        seed: Option<u64>,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(ContinuumError::InvalidArgument("batch_size must be > 0".into()));
        }
        Ok(Self {
            dataset,
            batch_size,
            shuffle,
            drop_last,
            seed,
            epoch_counter: Cell::new(0),
        })
    }

    /// Number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    pub fn dataset(&self) -> &OperatorDataset {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Current epoch counter (incremented by each shuffled `iter()` call).
    pub fn epoch(&self) -> u64 {
        self.epoch_counter.get()
    }

    /// Set the epoch counter (useful when resuming training).
    pub fn set_epoch(&self, epoch: u64) {
        self.epoch_counter.set(epoch);
    }

    /// Return an iterator over batches for one epoch.
    pub fn iter(&self) -> OperatorDataLoaderIter<'_> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();

        if self.shuffle {
            let epoch = self.epoch_counter.get();
            self.epoch_counter.set(epoch + 1);
            match self.seed {
                // Vary the seed per epoch: new order each epoch, same order per run.
                Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed.wrapping_add(epoch))),
                None => indices.shuffle(&mut rand::thread_rng()),
            }
        }

        OperatorDataLoaderIter {
            loader: self,
            indices,
            pos: 0,
        }
    }
}

/// Iterator over OperatorDataLoader batches.
pub struct OperatorDataLoaderIter<'a> {
    loader: &'a OperatorDataLoader,
    indices: Vec<usize>,
    pos: usize,
}

impl Iterator for OperatorDataLoaderIter<'_> {
    type Item = Result<OperatorBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        if self.pos >= n {
            return None;
        }

        let end = (self.pos + self.loader.batch_size).min(n);
        if self.loader.drop_last && end - self.pos < self.loader.batch_size {
            return None;
        }

        let batch = self.loader.dataset.select(&self.indices[self.pos..end]);
        self.pos = end;
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuum_core::Tensor;

    fn make_dataset(n: usize) -> OperatorDataset {
        let data: Vec<f32> = (0..n).flat_map(|i| [i as f32, i as f32]).collect();
        let t = Tensor::from_f32(&data, &[n, 2, 1]);
        OperatorDataset::new(t.clone(), t.clone(), t.clone(), t).unwrap()
    }

    fn order(batch: &OperatorBatch) -> Vec<f32> {
        (0..batch.len()).map(|i| batch.x.at(&[i, 0, 0]).unwrap()).collect()
    }

    #[test]
    fn test_dataloader_basic() {
        let loader = OperatorDataLoader::new(make_dataset(10), 3, false, false, None).unwrap();
        assert_eq!(loader.num_batches(), 4); // ceil(10/3) = 4

        let batches: Vec<_> = loader.iter().collect::<Result<_>>().unwrap();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[3].len(), 1); // last incomplete batch
        assert_eq!(order(&batches[1]), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_dataloader_drop_last() {
        let loader = OperatorDataLoader::new(make_dataset(10), 3, false, true, None).unwrap();
        assert_eq!(loader.num_batches(), 3); // floor(10/3) = 3

        let batches: Vec<_> = loader.iter().collect::<Result<_>>().unwrap();
        assert_eq!(batches.len(), 3);
        for b in &batches {
            assert_eq!(b.len(), 3);
            assert_eq!(b.u.dims(), &[3, 2, 1]);
        }
    }

    #[test]
    fn test_dataloader_rejects_zero_batch() {
        assert!(OperatorDataLoader::new(make_dataset(2), 0, false, false, None).is_err());
    }

    #[test]
    fn test_dataloader_shuffle_deterministic() {
        let l1 = OperatorDataLoader::new(make_dataset(10), 10, true, false, Some(42)).unwrap();
        let l2 = OperatorDataLoader::new(make_dataset(10), 10, true, false, Some(42)).unwrap();
        let b1 = l1.iter().next().unwrap().unwrap();
        let b2 = l2.iter().next().unwrap().unwrap();
        assert_eq!(order(&b1), order(&b2), "same seed should produce same first-epoch order");
    }

    #[test]
    fn test_dataloader_shuffle_varies_per_epoch() {
        let loader = OperatorDataLoader::new(make_dataset(10), 10, true, false, Some(42)).unwrap();
        let b1 = loader.iter().next().unwrap().unwrap();
        let b2 = loader.iter().next().unwrap().unwrap();
        assert_eq!(loader.epoch(), 2);
        assert_ne!(order(&b1), order(&b2), "different epochs should produce different shuffle order");

        let mut sorted = order(&b2);
        sorted.sort_by(f32::total_cmp);
        assert_eq!(sorted, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_dataloader_resume_epoch() {
        let loader = OperatorDataLoader::new(make_dataset(10), 10, true, false, Some(7)).unwrap();
        let _ = loader.iter();
        let second = order(&loader.iter().next().unwrap().unwrap());
        loader.set_epoch(1);
        assert_eq!(order(&loader.iter().next().unwrap().unwrap()), second);
    }
}

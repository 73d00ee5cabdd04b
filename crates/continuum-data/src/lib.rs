//! # continuum-data
//!
//! Data handling for operator learning.
//!
//! Provides:
//! - `TensorShape` / `DatasetShapes` — the shape contract shared by data sets and operators
//! - `OperatorDataset` — validated collection of `(x, u, y, v)` observations
//! - `Normalize` — per-role transforms applied on access
//! - `split` — seeded train/test partitioning
//! - `OperatorDataLoader` — batched, optionally shuffled iteration
//! - `Sine` — sine-wave benchmark data
//! - `UniformBoxSampler` — uniform samples from an n-dimensional box

pub mod shape;
pub mod dataset;
pub mod transform;
pub mod split;
pub mod dataloader;
pub mod sine;
pub mod sampler;

pub use shape::{DatasetShapes, TensorShape};
pub use dataset::{Observation, OperatorBatch, OperatorDataset};
pub use transform::{Normalize, Role, Transform};
pub use split::split;
pub use dataloader::{OperatorDataLoader, OperatorDataLoaderIter};
pub use sine::Sine;
pub use sampler::UniformBoxSampler;

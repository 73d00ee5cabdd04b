//! # continuum-core
//!
//! Core tensor engine for the Continuum operator-learning library.
//!
//! Provides the foundational `Tensor` type with:
//! - Row-major f32 storage shared between views
//! - Zero-copy views (reshape, transpose, unsqueeze)
//! - Broadcasting arithmetic, batched matmul and deterministic reductions
//! - Explicit run configuration (seed and device preference)

pub mod device;
pub mod storage;
pub mod shape;
pub mod tensor;
pub mod ops;
pub mod error;
pub mod config;
pub mod prelude;

pub use device::{Device, DevicePreference};
pub use storage::Storage;
pub use shape::Shape;
pub use tensor::Tensor;
pub use error::ContinuumError;
pub use config::RunConfig;

pub type Result<T> = std::result::Result<T, ContinuumError>;

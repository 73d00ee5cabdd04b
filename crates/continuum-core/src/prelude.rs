//! Convenience re-exports for common continuum-core types.
//!
//! ```rust
//! use continuum_core::prelude::*;
//! ```

pub use crate::Tensor;
pub use crate::Device;
pub use crate::Shape;
pub use crate::ContinuumError;
pub use crate::RunConfig;
pub use crate::Result;

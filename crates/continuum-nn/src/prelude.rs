//! Convenience re-exports for common continuum-nn types.
//!
//! ```rust
//! use continuum_nn::prelude::*;
//! ```

pub use crate::Module;
pub use crate::Linear;
pub use crate::Activation;
pub use crate::DeepResidualNetwork;

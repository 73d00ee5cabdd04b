//! # continuum-nn
//!
//! Neural network layers for Continuum: the building blocks of learned
//! kernel functions.

pub mod module;
pub mod linear;
pub mod activations;
pub mod residual;
pub mod loss;
pub mod prelude;

pub use module::Module;
pub use linear::Linear;
pub use activations::Activation;
pub use residual::{DeepResidualNetwork, ResidualLayer};
pub use loss::mse_loss;

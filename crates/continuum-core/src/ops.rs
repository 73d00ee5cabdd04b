//! Tensor operations: arithmetic, reduction, comparison, manipulation.
//!
//! All operations return new tensors (functional style).

pub mod arithmetic;
pub mod reduction;
pub mod comparison;
pub mod manipulation;

//! # continuum-operators
//!
//! Operators mapping a function sampled at sensor points to predictions at
//! query points.
//!
//! Provides:
//! - `Operator` — the contract every operator satisfies toward a training loop
//! - `KernelFunction` — pairwise sensor/query kernels, with `NeuralNetworkKernel`,
//!   `DiracKernel` and `ConstantKernel`
//! - `NaiveIntegralKernel` — discretized kernel-integral operator
//! - `OperatorLoss` / `MseLoss` / `dataset_loss`

pub mod operator;
pub mod kernels;
pub mod integral;
pub mod loss;

pub use operator::Operator;
pub use kernels::{ConstantKernel, DiracKernel, KernelFunction, NeuralNetworkKernel};
pub use integral::{NaiveIntegralKernel, QuadratureRule};
pub use loss::{dataset_loss, MseLoss, OperatorLoss};

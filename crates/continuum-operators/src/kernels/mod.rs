//! Kernel functions: pairwise interactions between sensor and query points.
//!
//! A kernel maps sensor coordinates `[observations, sensors, x.dim]` and query
//! coordinates `[observations, queries, y.dim]` to a kernel-value tensor
//! `[observations, sensors, queries, u.dim, v.dim]`: one channel-mixing
//! matrix per (sensor, query) pair.

mod fixed;
mod neural;

pub use fixed::{ConstantKernel, DiracKernel};
pub use neural::NeuralNetworkKernel;

use continuum_core::{ContinuumError, Result, Tensor};
use continuum_data::DatasetShapes;

pub trait KernelFunction: Send + Sync {
    /// The shape contract the kernel was built for.
    fn shapes(&self) -> &DatasetShapes;

    /// Kernel values for every (sensor, query) pair of every observation.
    fn evaluate(&self, x: &Tensor, y: &Tensor) -> Result<Tensor>;

    /// Trainable parameters, if any.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }
}

/// Extents of one kernel evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PairGrid {
    pub observations: usize,
    pub sensors: usize,
    pub queries: usize,
}

impl PairGrid {
    /// Validate `x` and `y` against `shapes` and read the evaluation extents.
    ///
    /// Sensor and query counts are free; coordinate dims and the observation
    /// count are not.
    pub(crate) fn of(shapes: &DatasetShapes, x: &Tensor, y: &Tensor) -> Result<Self> {
        check_role(x, shapes.x().dim())?;
        check_role(y, shapes.y().dim())?;
        if x.dims()[0] != y.dims()[0] {
            return Err(ContinuumError::roles("x", x.dims(), "y", y.dims()));
        }
        Ok(Self {
            observations: x.dims()[0],
            sensors: x.dims()[1],
            queries: y.dims()[1],
        })
    }

    /// `[observations, sensors, queries, u.dim, v.dim]`.
    pub(crate) fn kernel_dims(&self, shapes: &DatasetShapes) -> [usize; 5] {
        [
            self.observations,
            self.sensors,
            self.queries,
            shapes.u().dim(),
            shapes.v().dim(),
        ]
    }
}

/// `t` must be `[observations, points, dim]`.
pub(crate) fn check_role(t: &Tensor, dim: usize) -> Result<()> {
    match t.dims() {
        [_, _, d] if *d == dim => Ok(()),
        dims => Err(ContinuumError::ShapeMismatch {
            expected: vec![dims.first().copied().unwrap_or(0), dims.get(1).copied().unwrap_or(0), dim],
            got: dims.to_vec(),
        }),
    }
}

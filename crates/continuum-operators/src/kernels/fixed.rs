use continuum_core::{ContinuumError, Result, Tensor};
use continuum_data::DatasetShapes;
use tracing::trace;

use super::{KernelFunction, PairGrid};

/// Indicator kernel: 1 where a sensor and a query coincide, 0 elsewhere.
///
/// Points coincide when their squared distance is at most `tolerance`
/// (zero by default, i.e. exact equality). The indicator is broadcast over
/// the whole channel block.
#[derive(Clone, Debug)]
pub struct DiracKernel {
    shapes: DatasetShapes,
    tolerance: f32,
}

impl DiracKernel {
    /// Exact-coincidence indicator for `shapes`.
    pub fn new(shapes: DatasetShapes) -> Self {
        Self { shapes, tolerance: 0.0 }
    }

    /// Indicator that also treats points within squared distance
    /// `tolerance` as coincident.
    ///
    /// Fails with [`ContinuumError::InvalidArgument`] on a negative or NaN
    /// tolerance.
    pub fn with_tolerance(shapes: DatasetShapes, tolerance: f32) -> Result<Self> {
        if tolerance < 0.0 || tolerance.is_nan() {
            return Err(ContinuumError::InvalidArgument(format!(
                "dirac tolerance must be non-negative, got {tolerance}"
            )));
        }
        Ok(Self { shapes, tolerance })
    }

    /// Squared-distance tolerance below which points coincide.
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }
}

impl KernelFunction for DiracKernel {
    fn shapes(&self) -> &DatasetShapes {
        &self.shapes
    }

    fn evaluate(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let grid = PairGrid::of(&self.shapes, x, y)?;
        if self.shapes.x().dim() != self.shapes.y().dim() {
            return Err(ContinuumError::roles(
                "x",
                &[self.shapes.x().dim()],
                "y",
                &[self.shapes.y().dim()],
            ));
        }
        trace!(?grid, "dirac kernel evaluate");

        // [b, s, 1, d] - [b, 1, q, d] -> [b, s, q, d]
        let diff = x.unsqueeze(2)?.sub(&y.unsqueeze(1)?)?;
        let dist = diff.mul(&diff)?.sum_axis(3)?;
        let indicator = dist.isclose(&Tensor::scalar(0.0), 0.0, self.tolerance)?;

        let (b, s, q) = (grid.observations, grid.sensors, grid.queries);
        indicator
            .reshape_to(&[b, s, q, 1, 1])?
            .broadcast_to(&grid.kernel_dims(&self.shapes))
    }
}

/// Kernel whose every value is `value`.
#[derive(Clone, Debug)]
pub struct ConstantKernel {
    shapes: DatasetShapes,
    value: f32,
}

impl ConstantKernel {
    /// A kernel returning `value` for every pair and channel.
    pub fn new(shapes: DatasetShapes, value: f32) -> Self {
        Self { shapes, value }
    }

    /// The constant returned for every pair.
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl KernelFunction for ConstantKernel {
    fn shapes(&self) -> &DatasetShapes {
        &self.shapes
    }

    fn evaluate(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let grid = PairGrid::of(&self.shapes, x, y)?;
        Ok(Tensor::full(&grid.kernel_dims(&self.shapes), self.value))
    }
}

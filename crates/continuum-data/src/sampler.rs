//! Uniform sampling of points from an n-dimensional box.

use continuum_core::{ContinuumError, Result, Tensor};
use rand::Rng;

/// Samples uniformly from the right-open box `[x_min, x_max)`.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformBoxSampler {
    x_min: Tensor,
    x_max: Tensor,
    x_delta: Tensor,
}

impl UniformBoxSampler {
    /// Box `[x_min, x_max]` per coordinate.
    ///
    /// Both bounds must have the same non-zero length and `x_min <= x_max`
    /// elementwise.
    pub fn new(x_min: &[f32], x_max: &[f32]) -> Result<Self> {
        if x_min.len() != x_max.len() || x_min.is_empty() {
            return Err(ContinuumError::ShapeMismatch {
                expected: vec![x_min.len()],
                got: vec![x_max.len()],
            });
        }
        if x_min.iter().zip(x_max).any(|(lo, hi)| lo > hi || lo.is_nan() || hi.is_nan()) {
            return Err(ContinuumError::InvalidArgument(
                "box lower bound must not exceed its upper bound".into(),
            ));
        }
        let x_min = Tensor::from_f32(x_min, &[x_min.len()]);
        let x_max = Tensor::from_f32(x_max, &[x_max.len()]);
        let x_delta = x_max.sub(&x_min)?;
        Ok(Self { x_min, x_max, x_delta })
    }

    pub fn ndim(&self) -> usize {
        self.x_min.numel()
    }

    pub fn x_min(&self) -> &Tensor {
        &self.x_min
    }

    pub fn x_max(&self) -> &Tensor {
        &self.x_max
    }

    /// `x_max - x_min`.
    pub fn x_delta(&self) -> &Tensor {
        &self.x_delta
    }

    /// `n` samples as an `[n, ndim]` tensor.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Tensor> {
        let unit = Tensor::rand_uniform(&[n, self.ndim()], 0.0, 1.0, rng);
        unit.mul(&self.x_delta)?.add(&self.x_min)
    }
}

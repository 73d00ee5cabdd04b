//! Comparison operations on tensors.

use crate::error::ContinuumError;
use crate::tensor::Tensor;
use crate::Result;

impl Tensor {
    /// Element-wise `|self - other| <= atol + rtol * |other|`, broadcasting.
    ///
    /// Returns a mask of 1.0 (close) and 0.0 (not close).
    pub fn isclose(&self, other: &Tensor, rtol: f32, atol: f32) -> Result<Tensor> {
        self.sub(other)?
            .abs()
            .sub(&other.abs().mul_scalar(rtol).add_scalar(atol))
            .map(|excess| excess.map(|e| if e <= 0.0 { 1.0 } else { 0.0 }))
    }

    /// Whether both tensors have the same shape and every element is close.
    pub fn allclose(&self, other: &Tensor, rtol: f32, atol: f32) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let a = self.contiguous_data();
        let b = other.contiguous_data();
        a.iter()
            .zip(b.iter())
            .all(|(&x, &y)| (x - y).abs() <= atol + rtol * y.abs())
    }

    /// Largest absolute element-wise difference between equally shaped tensors.
    pub fn max_abs_diff(&self, other: &Tensor) -> Result<f32> {
        if self.shape() != other.shape() {
            return Err(ContinuumError::ShapeMismatch {
                expected: self.dims().to_vec(),
                got: other.dims().to_vec(),
            });
        }
        let a = self.contiguous_data();
        let b = other.contiguous_data();
        Ok(a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(0.0, f32::max))
    }
}

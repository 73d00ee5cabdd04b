//! Loss functions.

use continuum_core::{ContinuumError, Result, Tensor};

/// Mean squared error: mean((pred - target)^2).
///
/// Shapes must match exactly; the loss never broadcasts a prediction
/// against its target.
pub fn mse_loss(pred: &Tensor, target: &Tensor) -> Result<f32> {
    if pred.dims() != target.dims() {
        return Err(ContinuumError::ShapeMismatch {
            expected: target.dims().to_vec(),
            got: pred.dims().to_vec(),
        });
    }
    let diff = pred.sub(target)?;
    Ok(diff.mul(&diff)?.mean())
}

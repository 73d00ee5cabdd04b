//! Losses over operator predictions.

use continuum_core::{Result, Tensor};
use continuum_data::OperatorDataset;
use continuum_nn::mse_loss;

use crate::operator::Operator;

/// Scalar loss of `operator` on one batch `(x, u, y, v)`.
pub trait OperatorLoss: Send + Sync {
    fn loss(&self, operator: &dyn Operator, x: &Tensor, u: &Tensor, y: &Tensor, v: &Tensor) -> Result<f32>;
}

/// Mean squared error between `operator(x, u, y)` and `v`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MseLoss;

impl OperatorLoss for MseLoss {
    fn loss(&self, operator: &dyn Operator, x: &Tensor, u: &Tensor, y: &Tensor, v: &Tensor) -> Result<f32> {
        let prediction = operator.forward(x, u, y)?;
        mse_loss(&prediction, v)
    }
}

/// Sum of the per-observation loss over a whole data set.
///
/// Each observation is evaluated as a batch of one, with the data set's
/// transforms applied.
pub fn dataset_loss(dataset: &OperatorDataset, operator: &dyn Operator, loss: &dyn OperatorLoss) -> Result<f32> {
    let mut total = 0.0;
    for i in 0..dataset.len() {
        let batch = dataset.select(&[i])?;
        total += loss.loss(operator, &batch.x, &batch.u, &batch.y, &batch.v)?;
    }
    Ok(total)
}

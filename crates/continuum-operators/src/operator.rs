use continuum_core::{Result, Tensor};
use continuum_data::DatasetShapes;

/// Maps sensor coordinates `x` and sensor values `u` to predicted values at
/// query coordinates `y`.
///
/// Shapes follow the contract returned by [`Operator::shapes`]:
/// - `x`: `[observations, sensors, x.dim]`
/// - `u`: `[observations, sensors, u.dim]`
/// - `y`: `[observations, queries, y.dim]`
/// - output: `[observations, queries, v.dim]`
///
/// Sensor and query counts may differ from the contract.
pub trait Operator: Send + Sync {
    fn shapes(&self) -> &DatasetShapes;

    fn forward(&self, x: &Tensor, u: &Tensor, y: &Tensor) -> Result<Tensor>;

    /// Trainable parameters, if any.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }
}

use continuum_core::{Result, Tensor};
use continuum_data::DatasetShapes;
use continuum_nn::{Activation, DeepResidualNetwork, Module};
use rand::Rng;
use tracing::{debug, trace};

use super::{KernelFunction, PairGrid};

/// Learned kernel: a residual network applied to the concatenated
/// coordinates `[x_s, y_q]` of every (sensor, query) pair.
///
/// The network has input width `x.dim + y.dim`, `kernel_depth` residual
/// layers of width `kernel_width`, and `u.dim * v.dim` outputs reshaped into
/// the channel-mixing block. All pairs share one set of weights, so the
/// kernel can be evaluated at any sensor or query resolution.
#[derive(Clone)]
pub struct NeuralNetworkKernel {
    shapes: DatasetShapes,
    net: DeepResidualNetwork,
}

impl NeuralNetworkKernel {
    /// Tanh network with weights drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(shapes: DatasetShapes, kernel_width: usize, kernel_depth: usize, rng: &mut R) -> Self {
        Self::with_activation(shapes, kernel_width, kernel_depth, Activation::Tanh, rng)
    }

    /// Like [`NeuralNetworkKernel::new`], with a chosen activation.
    pub fn with_activation<R: Rng + ?Sized>(
        shapes: DatasetShapes,
        kernel_width: usize,
        kernel_depth: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let input_size = shapes.x().dim() + shapes.y().dim();
        let output_size = shapes.u().dim() * shapes.v().dim();
        let net = DeepResidualNetwork::new(input_size, output_size, kernel_width, kernel_depth, activation, rng);
        debug!(%shapes, kernel_width, kernel_depth, ?activation, "neural network kernel created");
        Self { shapes, net }
    }

    /// The network mapping a concatenated `(x, y)` pair to a flattened
    /// `u.dim x v.dim` block.
    pub fn network(&self) -> &DeepResidualNetwork {
        &self.net
    }

    /// Mutable access for an external optimizer.
    pub fn network_mut(&mut self) -> &mut DeepResidualNetwork {
        &mut self.net
    }

    /// All coordinate pairs `[observations, sensors, queries, x.dim + y.dim]`.
    fn pairs(&self, grid: &PairGrid, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let (b, s, q) = (grid.observations, grid.sensors, grid.queries);
        let xs = x.unsqueeze(2)?.broadcast_to(&[b, s, q, self.shapes.x().dim()])?;
        let ys = y.unsqueeze(1)?.broadcast_to(&[b, s, q, self.shapes.y().dim()])?;
        Tensor::cat(&[&xs, &ys], -1)
    }
}

impl KernelFunction for NeuralNetworkKernel {
    fn shapes(&self) -> &DatasetShapes {
        &self.shapes
    }

    fn evaluate(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let grid = PairGrid::of(&self.shapes, x, y)?;
        trace!(?grid, "neural kernel evaluate");
        let pairs = self.pairs(&grid, x, y)?;
        // One batched pass over every pair.
        let values = self.net.forward(&pairs)?;
        values.reshape_to(&grid.kernel_dims(&self.shapes))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.net.parameters()
    }
}

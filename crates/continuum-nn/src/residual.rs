//! Residual feed-forward networks.

use continuum_core::{Result, Tensor};
use rand::Rng;

use crate::activations::Activation;
use crate::linear::Linear;
use crate::module::Module;

/// One residual block: `act(W x + b) + x`.
///
/// Input and output widths are equal so the skip connection needs no
/// projection.
#[derive(Clone)]
pub struct ResidualLayer {
    linear: Linear,
    activation: Activation,
}

impl ResidualLayer {
    /// Square `width x width` block with weights drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(width: usize, activation: Activation, rng: &mut R) -> Self {
        Self {
            linear: Linear::new(width, width, true, rng),
            activation,
        }
    }

    pub fn width(&self) -> usize {
        self.linear.in_features()
    }
}

impl Module for ResidualLayer {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let hidden = self.activation.apply(&self.linear.forward(input)?);
        hidden.add(input)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.linear.parameters()
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        self.linear
            .named_parameters()
            .into_iter()
            .map(|(name, t)| (format!("linear.{}", name), t))
            .collect()
    }

    fn set_parameters(&mut self, params: &[Tensor]) -> usize {
        self.linear.set_parameters(params)
    }
}

/// Input projection, `depth` residual blocks of constant `width`, then an
/// output projection.
///
/// The last axis of the input is the feature axis; any leading axes are kept.
#[derive(Clone)]
pub struct DeepResidualNetwork {
    first: Linear,
    hidden: Vec<ResidualLayer>,
    last: Linear,
}

impl DeepResidualNetwork {
    /// `input_size -> width`, then `depth` residual blocks, then `width -> output_size`.
    ///
    /// With `depth == 0` the network is the two projections alone.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        width: usize,
        depth: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let first = Linear::new(input_size, width, true, rng);
        let hidden = (0..depth)
            .map(|_| ResidualLayer::new(width, activation, rng))
            .collect();
        let last = Linear::new(width, output_size, true, rng);
        Self { first, hidden, last }
    }

    pub fn input_size(&self) -> usize {
        self.first.in_features()
    }

    pub fn output_size(&self) -> usize {
        self.last.out_features()
    }

    /// Number of residual blocks.
    pub fn depth(&self) -> usize {
        self.hidden.len()
    }
}

impl Module for DeepResidualNetwork {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let mut x = self.first.forward(input)?;
        for layer in &self.hidden {
            x = layer.forward(&x)?;
        }
        self.last.forward(&x)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.first.parameters();
        for layer in &self.hidden {
            params.extend(layer.parameters());
        }
        params.extend(self.last.parameters());
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params: Vec<(String, &Tensor)> = self
            .first
            .named_parameters()
            .into_iter()
            .map(|(n, t)| (format!("first.{}", n), t))
            .collect();
        for (i, layer) in self.hidden.iter().enumerate() {
            for (n, t) in layer.named_parameters() {
                params.push((format!("hidden.{}.{}", i, n), t));
            }
        }
        for (n, t) in self.last.named_parameters() {
            params.push((format!("last.{}", n), t));
        }
        params
    }

    fn set_parameters(&mut self, params: &[Tensor]) -> usize {
        let mut offset = self.first.set_parameters(params);
        for layer in &mut self.hidden {
            offset += layer.set_parameters(&params[offset.min(params.len())..]);
        }
        offset + self.last.set_parameters(&params[offset.min(params.len())..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_residual_layer_with_zero_weights_is_identity() {
        let mut layer = ResidualLayer::new(3, Activation::Tanh, &mut StdRng::seed_from_u64(0));
        let used = layer.set_parameters(&[Tensor::zeros(&[3, 3]), Tensor::zeros(&[3])]);
        assert_eq!(used, 2);
        let x = Tensor::from_f32(&[1.0, -2.0, 3.0], &[1, 3]);
        // tanh(0) + x == x
        assert_eq!(layer.forward(&x).unwrap(), x);
    }

    #[test]
    fn test_deep_residual_shapes() {
        let net = DeepResidualNetwork::new(5, 4, 16, 3, Activation::Tanh, &mut StdRng::seed_from_u64(0));
        assert_eq!(net.input_size(), 5);
        assert_eq!(net.output_size(), 4);
        assert_eq!(net.depth(), 3);
        let out = net.forward(&Tensor::ones(&[2, 7, 5])).unwrap();
        assert_eq!(out.dims(), &[2, 7, 4]);
        // first (w, b) + 3 hidden (w, b) + last (w, b)
        assert_eq!(net.parameters().len(), 10);
        assert_eq!(net.num_parameters(), 5 * 16 + 16 + 3 * (16 * 16 + 16) + 16 * 4 + 4);
    }

    #[test]
    fn test_deep_residual_named_parameters() {
        let net = DeepResidualNetwork::new(2, 1, 4, 1, Activation::Tanh, &mut StdRng::seed_from_u64(0));
        let names: Vec<String> = net.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "first.weight",
                "first.bias",
                "hidden.0.linear.weight",
                "hidden.0.linear.bias",
                "last.weight",
                "last.bias",
            ]
        );
    }

    #[test]
    fn test_rows_are_evaluated_independently() {
        let net = DeepResidualNetwork::new(2, 3, 8, 2, Activation::Tanh, &mut StdRng::seed_from_u64(3));
        let batch = Tensor::from_f32(&[0.1, 0.2, -0.4, 0.9], &[2, 2]);
        let full = net.forward(&batch).unwrap().to_vec();
        let second = net.forward(&Tensor::from_f32(&[-0.4, 0.9], &[1, 2])).unwrap().to_vec();
        for (a, b) in full[3..].iter().zip(second.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}

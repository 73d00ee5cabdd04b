//! Activation functions.

use continuum_core::{Result, Tensor};

use crate::module::Module;

/// ReLU activation: max(0, x)
pub fn relu(input: &Tensor) -> Tensor {
    input.clamp(0.0, f32::INFINITY)
}

/// GELU activation: x * Φ(x) ≈ 0.5 * x * (1 + tanh(sqrt(2/π) * (x + 0.044715 * x^3)))
pub fn gelu(input: &Tensor) -> Tensor {
    input.map(|x| {
        let inner = std::f32::consts::FRAC_2_SQRT_PI
            * std::f32::consts::FRAC_1_SQRT_2
            * (x + 0.044715 * x * x * x);
        0.5 * x * (1.0 + inner.tanh())
    })
}

/// SiLU (Swish) activation: x * sigmoid(x)
pub fn silu(input: &Tensor) -> Tensor {
    input.map(|x| x / (1.0 + (-x).exp()))
}

/// Sigmoid activation: 1 / (1 + exp(-x))
pub fn sigmoid(input: &Tensor) -> Tensor {
    input.map(|x| 1.0 / (1.0 + (-x).exp()))
}

/// Hyperbolic tangent.
pub fn tanh(input: &Tensor) -> Tensor {
    input.tanh()
}

/// Element-wise activation selectable at construction time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Tanh,
    Relu,
    Gelu,
    Silu,
    Sigmoid,
}

impl Activation {
    pub fn apply(self, input: &Tensor) -> Tensor {
        match self {
            Activation::Tanh => tanh(input),
            Activation::Relu => relu(input),
            Activation::Gelu => gelu(input),
            Activation::Silu => silu(input),
            Activation::Sigmoid => sigmoid(input),
        }
    }
}

impl Module for Activation {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        Ok(self.apply(input))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu() {
        let t = Tensor::from_f32(&[-1.0, 0.0, 2.0], &[3]);
        assert_eq!(relu(&t).to_vec(), vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_sigmoid_at_zero() {
        let t = Tensor::zeros(&[4]);
        assert!(sigmoid(&t).to_vec().iter().all(|&v| (v - 0.5).abs() < 1e-7));
    }

    #[test]
    fn test_gelu_and_silu_signs() {
        let t = Tensor::from_f32(&[-3.0, 0.0, 3.0], &[3]);
        let g = gelu(&t).to_vec();
        let s = silu(&t).to_vec();
        assert!(g[0] < 0.0 && g[0] > -0.1);
        assert_eq!(g[1], 0.0);
        assert!((g[2] - 3.0).abs() < 0.01);
        assert!(s[0] < 0.0);
        assert!(s[2] > 2.8);
    }

    #[test]
    fn test_activation_module_default_is_tanh() {
        let t = Tensor::from_f32(&[0.5, -0.5], &[2]);
        let out = Activation::default().forward(&t).unwrap();
        assert_eq!(out.to_vec(), vec![0.5f32.tanh(), (-0.5f32).tanh()]);
        assert!(Activation::Relu.parameters().is_empty());
    }
}

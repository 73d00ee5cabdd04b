use continuum_core::{ContinuumError, Result, Tensor};
use rand::Rng;

use crate::module::Module;

/// Fully connected linear layer: y = x @ W^T + b
///
/// Accepts inputs of any rank ≥ 1; the last axis is the feature axis and all
/// leading axes are treated as one flattened batch.
#[derive(Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Option<Tensor>,
}

impl Linear {
    /// Create a new Linear layer with Xavier-uniform weights drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, bias: bool, rng: &mut R) -> Self {
        // U(-sqrt(6/(in+out)), sqrt(6/(in+out)))
        let limit = (6.0 / (in_features + out_features).max(1) as f32).sqrt();
        let weight = Tensor::rand_uniform(&[out_features, in_features], -limit, limit, rng);
        let bias = bias.then(|| Tensor::zeros(&[out_features]));
        Self { weight, bias }
    }

    /// Build from explicit weight `[out, in]` and optional bias `[out]`.
    pub fn from_weights(weight: Tensor, bias: Option<Tensor>) -> Result<Self> {
        if weight.ndim() != 2 {
            return Err(ContinuumError::ShapeMismatch {
                expected: vec![0, 0],
                got: weight.dims().to_vec(),
            });
        }
        if let Some(ref b) = bias {
            if b.dims() != [weight.dims()[0]] {
                return Err(ContinuumError::ShapeMismatch {
                    expected: vec![weight.dims()[0]],
                    got: b.dims().to_vec(),
                });
            }
        }
        Ok(Self { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.dims()[1]
    }

    pub fn out_features(&self) -> usize {
        self.weight.dims()[0]
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let in_features = self.in_features();
        let dims = input.dims();
        if dims.last() != Some(&in_features) {
            return Err(ContinuumError::ShapeMismatch {
                expected: vec![in_features],
                got: dims.to_vec(),
            });
        }

        let rows = input.numel() / in_features.max(1);
        let flat = input.reshape_to(&[rows, in_features])?;
        let mut output = flat.matmul(&self.weight.transpose()?)?;
        if let Some(ref bias) = self.bias {
            output = output.add(bias)?;
        }

        let mut out_dims = dims.to_vec();
        if let Some(last) = out_dims.last_mut() {
            *last = self.out_features();
        }
        output.reshape_to(&out_dims)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.weight];
        if let Some(ref b) = self.bias {
            params.push(b);
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = vec![("weight".to_string(), &self.weight)];
        if let Some(ref b) = self.bias {
            params.push(("bias".to_string(), b));
        }
        params
    }

    fn set_parameters(&mut self, params: &[Tensor]) -> usize {
        let mut used = 0;
        if let Some(w) = params.first() {
            self.weight = w.clone();
            used += 1;
        }
        if let (Some(_), Some(b)) = (self.bias.as_ref(), params.get(1)) {
            self.bias = Some(b.clone());
            used += 1;
        }
        used
    }
}

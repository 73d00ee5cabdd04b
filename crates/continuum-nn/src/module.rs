use std::collections::HashMap;

use continuum_core::{Result, Tensor};

/// Base trait for all neural network modules.
///
/// Implement this trait to define custom layers and models. Modules are
/// `Send + Sync` so a trained network can be evaluated from several threads.
pub trait Module: Send + Sync {
    /// Forward pass.
    fn forward(&self, input: &Tensor) -> Result<Tensor>;

    /// Get all trainable parameters.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Get named parameters (for state_dict).
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    /// Write updated parameters back into the module.
    ///
    /// Consumes parameters from the front of the slice in the same order
    /// as `parameters()` returns them. Returns how many were consumed.
    fn set_parameters(&mut self, _params: &[Tensor]) -> usize {
        0
    }

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }

    /// Export state dictionary.
    fn state_dict(&self) -> HashMap<String, Tensor> {
        self.named_parameters()
            .into_iter()
            .map(|(name, t)| (name, t.clone()))
            .collect()
    }
}

use std::sync::Arc;

use crate::Device;

/// Shared, reference-counted f32 buffer backing one or more tensors.
///
/// Views produced by reshape/transpose/unsqueeze clone the `Arc`, never the
/// data. Mutation goes through [`Storage::as_mut_slice`], which copies the
/// buffer first if it is shared.
#[derive(Debug, Clone)]
pub struct Storage {
    data: Arc<Vec<f32>>,
    device: Device,
}

impl Storage {
    /// Allocate `numel` zeros on the CPU.
    pub fn zeros(numel: usize) -> Self {
        Self::from_vec(vec![0.0; numel])
    }

    pub fn from_vec(data: Vec<f32>) -> Self {
        Self {
            data: Arc::new(data),
            device: Device::Cpu,
        }
    }

    pub fn from_slice(data: &[f32]) -> Self {
        Self::from_vec(data.to_vec())
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access, copy-on-write when other tensors share the buffer.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Whether this is the only handle to the buffer.
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.data) == 1
    }
}

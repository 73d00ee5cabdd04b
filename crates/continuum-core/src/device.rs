use std::fmt;

use serde::{Deserialize, Serialize};

/// Compute device for tensor storage and operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Device {
    /// Host memory, plain Rust loops (with rayon for large reductions)
    #[default]
    Cpu,
    /// CUDA GPU with device index
    Cuda(usize),
}

impl Device {
    /// Whether this is a CPU device.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Whether this is a CUDA device.
    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }

    /// Get the CUDA device index, if applicable.
    pub fn cuda_index(&self) -> Option<usize> {
        match self {
            Device::Cuda(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Devices this build can actually execute on.
    pub fn available() -> Vec<Device> {
        vec![Device::Cpu]
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(idx) => write!(f, "cuda:{idx}"),
        }
    }
}

/// Which device a run would like to use.
///
/// Resolved against [`Device::available`] by [`DevicePreference::resolve`];
/// nothing is inspected until a caller asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreference {
    /// Fastest available device.
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl DevicePreference {
    /// Pick a concrete device, falling back to CPU when the preferred one is missing.
    pub fn resolve(&self) -> Device {
        let available = Device::available();
        match *self {
            DevicePreference::Cpu => Device::Cpu,
            DevicePreference::Auto => available
                .iter()
                .copied()
                .find(Device::is_cuda)
                .unwrap_or(Device::Cpu),
            DevicePreference::Cuda(idx) => {
                let wanted = Device::Cuda(idx);
                if available.contains(&wanted) {
                    wanted
                } else {
                    tracing::warn!("{} requested but not available, falling back to cpu", wanted);
                    Device::Cpu
                }
            }
        }
    }
}

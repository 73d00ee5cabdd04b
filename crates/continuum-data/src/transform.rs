//! Per-role transforms applied when observations are read from a data set.

use std::fmt;

use continuum_core::{ContinuumError, Result, Tensor};

/// One of the four roles of an operator data tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sensor coordinates.
    X,
    /// Sensor values.
    U,
    /// Query coordinates.
    Y,
    /// Target values.
    V,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::X, Role::U, Role::Y, Role::V];

    pub fn name(self) -> &'static str {
        match self {
            Role::X => "x",
            Role::U => "u",
            Role::Y => "y",
            Role::V => "v",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An invertible map over the feature axis of a role tensor.
///
/// Implementations must accept both a single observation `[num, dim]` and a
/// batch `[batch, num, dim]`.
pub trait Transform: Send + Sync + fmt::Debug {
    fn forward(&self, tensor: &Tensor) -> Result<Tensor>;

    /// Inverse of [`Transform::forward`].
    fn backward(&self, tensor: &Tensor) -> Result<Tensor>;
}

/// `(t - mean) / std`, broadcast over the last axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalize {
    mean: Tensor,
    std: Tensor,
}

impl Normalize {
    /// Fails unless `mean` and `std` share a shape and every `std` entry is
    /// finite and non-zero.
    pub fn new(mean: Tensor, std: Tensor) -> Result<Self> {
        if mean.dims() != std.dims() {
            return Err(ContinuumError::ShapeMismatch {
                expected: mean.dims().to_vec(),
                got: std.dims().to_vec(),
            });
        }
        if std.to_vec().iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(ContinuumError::InvalidArgument(
                "normalization std must be finite and non-zero".into(),
            ));
        }
        Ok(Self { mean, std })
    }

    /// Per-feature mean and standard deviation of a `[observations, num, dim]`
    /// tensor, pooled over observations and points.
    ///
    /// Features with zero spread get a std of 1.
    pub fn fit(tensor: &Tensor) -> Result<Self> {
        let dims = tensor.dims();
        if dims.len() != 3 {
            return Err(ContinuumError::ShapeMismatch {
                expected: vec![0, 0, 0],
                got: dims.to_vec(),
            });
        }
        let flat = tensor.reshape_to(&[dims[0] * dims[1], dims[2]])?;
        let mean = flat.mean_axis(0)?;
        let centered = flat.sub(&mean)?;
        let var = centered.mul(&centered)?.mean_axis(0)?;
        let std = var.map(|v| if v > 0.0 { v.sqrt() } else { 1.0 });
        Self::new(mean, std)
    }

    pub fn mean(&self) -> &Tensor {
        &self.mean
    }

    pub fn std(&self) -> &Tensor {
        &self.std
    }
}

impl Transform for Normalize {
    fn forward(&self, tensor: &Tensor) -> Result<Tensor> {
        tensor.sub(&self.mean)?.div(&self.std)
    }

    fn backward(&self, tensor: &Tensor) -> Result<Tensor> {
        tensor.mul(&self.std)?.add(&self.mean)
    }
}

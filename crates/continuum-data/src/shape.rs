//! Shape contract of operator data.

use std::fmt;

use continuum_core::{ContinuumError, Result};
use serde::{Deserialize, Serialize};

/// Number of points and per-point dimensionality of one role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTensorShape")]
pub struct TensorShape {
    num: usize,
    dim: usize,
}

#[derive(Deserialize)]
struct RawTensorShape {
    num: usize,
    dim: usize,
}

impl TryFrom<RawTensorShape> for TensorShape {
    type Error = ContinuumError;

    fn try_from(raw: RawTensorShape) -> Result<Self> {
        TensorShape::new(raw.num, raw.dim)
    }
}

impl TensorShape {
    /// Both `num` and `dim` must be positive.
    pub fn new(num: usize, dim: usize) -> Result<Self> {
        if num == 0 || dim == 0 {
            return Err(ContinuumError::InvalidArgument(format!(
                "tensor shape must be positive, got num={num}, dim={dim}"
            )));
        }
        Ok(Self { num, dim })
    }

    /// Read the shape of a rank-3 role tensor `[observations, num, dim]`.
    pub(crate) fn of_role(dims: &[usize]) -> Result<Self> {
        match dims {
            [_, num, dim] => Self::new(*num, *dim),
            _ => Err(ContinuumError::ShapeMismatch {
                expected: vec![0, 0, 0],
                got: dims.to_vec(),
            }),
        }
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(num={}, dim={})", self.num, self.dim)
    }
}

/// Shapes of the four roles of an operator data set.
///
/// Sensor coordinates `x` and sensor values `u` share their point count, as
/// do query coordinates `y` and target values `v`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDatasetShapes")]
pub struct DatasetShapes {
    num_observations: usize,
    x: TensorShape,
    u: TensorShape,
    y: TensorShape,
    v: TensorShape,
}

#[derive(Deserialize)]
struct RawDatasetShapes {
    num_observations: usize,
    x: TensorShape,
    u: TensorShape,
    y: TensorShape,
    v: TensorShape,
}

impl TryFrom<RawDatasetShapes> for DatasetShapes {
    type Error = ContinuumError;

    fn try_from(raw: RawDatasetShapes) -> Result<Self> {
        DatasetShapes::new(raw.num_observations, raw.x, raw.u, raw.y, raw.v)
    }
}

impl DatasetShapes {
    /// Shape contract of a data set.
    ///
    /// Sensor counts of `x` and `u` must agree, as must query counts of `y`
    /// and `v`.
    pub fn new(
        num_observations: usize,
        x: TensorShape,
        u: TensorShape,
        y: TensorShape,
        v: TensorShape,
    ) -> Result<Self> {
        if num_observations == 0 {
            return Err(ContinuumError::InvalidArgument(
                "data set must contain at least one observation".into(),
            ));
        }
        if x.num != u.num {
            return Err(ContinuumError::roles("x", &[x.num, x.dim], "u", &[u.num, u.dim]));
        }
        if y.num != v.num {
            return Err(ContinuumError::roles("y", &[y.num, y.dim], "v", &[v.num, v.dim]));
        }
        Ok(Self { num_observations, x, u, y, v })
    }

    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    /// Sensor coordinates.
    pub fn x(&self) -> TensorShape {
        self.x
    }

    /// Sensor values.
    pub fn u(&self) -> TensorShape {
        self.u
    }

    /// Query coordinates.
    pub fn y(&self) -> TensorShape {
        self.y
    }

    /// Target values.
    pub fn v(&self) -> TensorShape {
        self.v
    }

    /// The same per-observation contract for a different number of observations.
    pub fn with_num_observations(&self, num_observations: usize) -> Result<Self> {
        Self::new(num_observations, self.x, self.u, self.y, self.v)
    }

    /// Whether two contracts agree on every role, ignoring the observation count.
    pub fn same_roles(&self, other: &DatasetShapes) -> bool {
        self.x == other.x && self.u == other.u && self.y == other.y && self.v == other.v
    }
}

impl fmt::Display for DatasetShapes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DatasetShapes(num_observations={}, x={}, u={}, y={}, v={})",
            self.num_observations, self.x, self.u, self.y, self.v
        )
    }
}

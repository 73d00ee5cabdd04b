use thiserror::Error;

/// Every failure the Continuum crates can report.
///
/// Errors are raised where the violation is detected and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContinuumError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Two roles of an operator data tuple (x, u, y, v) disagree.
    #[error("Shape mismatch between {lhs} {lhs_shape:?} and {rhs} {rhs_shape:?}")]
    RoleMismatch {
        lhs: &'static str,
        lhs_shape: Vec<usize>,
        rhs: &'static str,
        rhs_shape: Vec<usize>,
    },

    #[error("Kernel output shape mismatch: expected {expected:?}, got {got:?}")]
    KernelOutputShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Invalid axis {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Cannot reshape tensor of {numel} elements into shape {shape:?}")]
    InvalidReshape { numel: usize, shape: Vec<isize> },

    #[error("Cannot broadcast shapes {a:?} and {b:?}")]
    BroadcastError { a: Vec<usize>, b: Vec<usize> },

    #[error("Index {index} out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Matmul dimension mismatch: [{m}x{k1}] @ [{k2}x{n}]")]
    MatmulDimMismatch {
        m: usize,
        k1: usize,
        k2: usize,
        n: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ContinuumError {
    /// Shorthand for a [`ContinuumError::RoleMismatch`] between two tensors.
    pub fn roles(lhs: &'static str, lhs_shape: &[usize], rhs: &'static str, rhs_shape: &[usize]) -> Self {
        ContinuumError::RoleMismatch {
            lhs,
            lhs_shape: lhs_shape.to_vec(),
            rhs,
            rhs_shape: rhs_shape.to_vec(),
        }
    }
}

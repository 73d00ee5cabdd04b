//! Element-wise arithmetic and matrix multiplication.

use crate::error::ContinuumError;
use crate::shape::Shape;
use crate::tensor::Tensor;
use crate::Result;

impl Tensor {
    /// Element-wise addition with broadcasting.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, |a, b| a + b)
    }

    /// Element-wise subtraction with broadcasting.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, |a, b| a - b)
    }

    /// Element-wise multiplication with broadcasting.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, |a, b| a * b)
    }

    /// Element-wise division with broadcasting.
    pub fn div(&self, other: &Tensor) -> Result<Tensor> {
        binary_op(self, other, |a, b| a / b)
    }

    pub fn neg(&self) -> Tensor {
        self.map(|a| -a)
    }

    pub fn abs(&self) -> Tensor {
        self.map(f32::abs)
    }

    pub fn sqrt(&self) -> Tensor {
        self.map(f32::sqrt)
    }

    pub fn exp(&self) -> Tensor {
        self.map(f32::exp)
    }

    pub fn tanh(&self) -> Tensor {
        self.map(f32::tanh)
    }

    pub fn add_scalar(&self, scalar: f32) -> Tensor {
        self.map(|a| a + scalar)
    }

    pub fn mul_scalar(&self, scalar: f32) -> Tensor {
        self.map(|a| a * scalar)
    }

    /// Divide every element by `scalar` (a true division, not a reciprocal multiply).
    pub fn div_scalar(&self, scalar: f32) -> Tensor {
        self.map(|a| a / scalar)
    }

    /// Clamp all elements to `[min, max]`.
    pub fn clamp(&self, min: f32, max: f32) -> Tensor {
        self.map(|a| a.clamp(min, max))
    }

    /// Apply `op` to every element.
    pub fn map(&self, op: impl Fn(f32) -> f32) -> Tensor {
        let data = self.contiguous_data();
        let result: Vec<f32> = data.iter().map(|&v| op(v)).collect();
        Tensor::from_parts(result, self.shape().clone())
    }

    /// Matrix multiplication: self @ other.
    ///
    /// Supports:
    /// - [M, K] @ [K, N] → [M, N]
    /// - [B, M, K] @ [B, K, N] → [B, M, N] (batched)
    /// - [B, M, K] @ [K, N] → [B, M, N] (shared right operand)
    /// - [M, K] @ [K] → [M]
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        let a_dims = self.dims();
        let b_dims = other.dims();

        match (a_dims.len(), b_dims.len()) {
            (2, 2) => {
                let out = matmul_kernel(self, other, 1, a_dims[0], a_dims[1], b_dims[0], b_dims[1], false)?;
                Ok(Tensor::from_parts(out, Shape::new(&[a_dims[0], b_dims[1]])))
            }
            (3, 3) => {
                if a_dims[0] != b_dims[0] {
                    return Err(ContinuumError::ShapeMismatch {
                        expected: a_dims.to_vec(),
                        got: b_dims.to_vec(),
                    });
                }
                let out = matmul_kernel(self, other, a_dims[0], a_dims[1], a_dims[2], b_dims[1], b_dims[2], false)?;
                Ok(Tensor::from_parts(out, Shape::new(&[a_dims[0], a_dims[1], b_dims[2]])))
            }
            (3, 2) => {
                let out = matmul_kernel(self, other, a_dims[0], a_dims[1], a_dims[2], b_dims[0], b_dims[1], true)?;
                Ok(Tensor::from_parts(out, Shape::new(&[a_dims[0], a_dims[1], b_dims[1]])))
            }
            (2, 1) => {
                let out = matmul_kernel(self, other, 1, a_dims[0], a_dims[1], b_dims[0], 1, false)?;
                Ok(Tensor::from_parts(out, Shape::new(&[a_dims[0]])))
            }
            _ => Err(ContinuumError::ShapeMismatch {
                expected: a_dims.to_vec(),
                got: b_dims.to_vec(),
            }),
        }
    }
}

/// Apply a binary operation element-wise with broadcasting.
fn binary_op(a: &Tensor, b: &Tensor, op: impl Fn(f32, f32) -> f32) -> Result<Tensor> {
    let out_shape = a.shape().broadcast_with(b.shape()).ok_or_else(|| {
        ContinuumError::BroadcastError {
            a: a.dims().to_vec(),
            b: b.dims().to_vec(),
        }
    })?;

    let a_data = a.contiguous_data();
    let b_data = b.contiguous_data();
    let numel = out_shape.numel();

    // Fast path: same shape
    if a.shape() == b.shape() {
        let result: Vec<f32> = a_data.iter().zip(b_data.iter()).map(|(&x, &y)| op(x, y)).collect();
        return Ok(Tensor::from_parts(result, out_shape));
    }

    let a_strides = broadcast_strides(a.shape(), &out_shape);
    let b_strides = broadcast_strides(b.shape(), &out_shape);
    let out_dims = out_shape.dims();

    let mut result = Vec::with_capacity(numel);
    let mut coord = vec![0usize; out_dims.len()];
    let (mut a_idx, mut b_idx) = (0usize, 0usize);
    for _ in 0..numel {
        result.push(op(a_data[a_idx], b_data[b_idx]));
        // Odometer increment over the output coordinates.
        for axis in (0..out_dims.len()).rev() {
            coord[axis] += 1;
            a_idx += a_strides[axis];
            b_idx += b_strides[axis];
            if coord[axis] < out_dims[axis] {
                break;
            }
            a_idx -= a_strides[axis] * out_dims[axis];
            b_idx -= b_strides[axis] * out_dims[axis];
            coord[axis] = 0;
        }
    }

    Ok(Tensor::from_parts(result, out_shape))
}

/// Row-major strides of `src` laid over `out`, with 0 on broadcast axes.
fn broadcast_strides(src: &Shape, out: &Shape) -> Vec<usize> {
    let offset = out.ndim() - src.ndim();
    let src_strides = src.contiguous_strides();
    (0..out.ndim())
        .map(|i| {
            if i < offset || src.dims()[i - offset] == 1 {
                0
            } else {
                src_strides[i - offset]
            }
        })
        .collect()
}

/// `batch` independent [M, K] @ [K, N] products. With `shared_rhs` the right
/// operand is a single [K, N] matrix used for every batch entry.
#[allow(clippy::too_many_arguments)]
fn matmul_kernel(
    a: &Tensor,
    b: &Tensor,
    batch: usize,
    m: usize,
    k1: usize,
    k2: usize,
    n: usize,
    shared_rhs: bool,
) -> Result<Vec<f32>> {
    if k1 != k2 {
        return Err(ContinuumError::MatmulDimMismatch { m, k1, k2, n });
    }

    let a_data = a.contiguous_data();
    let b_data = b.contiguous_data();
    let mut c_data = vec![0.0f32; batch * m * n];

    for bi in 0..batch {
        let a_off = bi * m * k1;
        let b_off = if shared_rhs { 0 } else { bi * k1 * n };
        let c_off = bi * m * n;
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f32;
                for p in 0..k1 {
                    sum += a_data[a_off + i * k1 + p] * b_data[b_off + p * n + j];
                }
                c_data[c_off + i * n + j] = sum;
            }
        }
    }

    Ok(c_data)
}

#[cfg(test)]
mod tests {
    use crate::{ContinuumError, Tensor};

    #[test]
    fn test_add_sub_mul_div() {
        let a = Tensor::from_f32(&[4.0, 6.0, 8.0], &[3]);
        let b = Tensor::from_f32(&[1.0, 2.0, 4.0], &[3]);
        assert_eq!(a.add(&b).unwrap().to_vec(), vec![5.0, 8.0, 12.0]);
        assert_eq!(a.sub(&b).unwrap().to_vec(), vec![3.0, 4.0, 4.0]);
        assert_eq!(a.mul(&b).unwrap().to_vec(), vec![4.0, 12.0, 32.0]);
        assert_eq!(a.div(&b).unwrap().to_vec(), vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_broadcast_add() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = Tensor::from_f32(&[10.0, 20.0, 30.0], &[3]);
        let c = a.add(&b).unwrap();
        assert_eq!(c.dims(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_broadcast_outer() {
        // (2, 1) * (1, 3) → (2, 3)
        let a = Tensor::from_f32(&[1.0, 2.0], &[2, 1]);
        let b = Tensor::from_f32(&[1.0, 10.0, 100.0], &[1, 3]);
        let c = a.mul(&b).unwrap();
        assert_eq!(c.to_vec(), vec![1.0, 10.0, 100.0, 2.0, 20.0, 200.0]);
    }

    #[test]
    fn test_broadcast_error() {
        let a = Tensor::ones(&[2, 3]);
        let b = Tensor::ones(&[4, 3]);
        assert!(matches!(a.add(&b), Err(ContinuumError::BroadcastError { .. })));
    }

    #[test]
    fn test_scalar_ops() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0], &[3]);
        assert_eq!(a.add_scalar(10.0).to_vec(), vec![11.0, 12.0, 13.0]);
        assert_eq!(a.mul_scalar(2.0).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(a.div_scalar(3.0).to_vec(), vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_unary_ops() {
        let a = Tensor::from_f32(&[-1.0, 0.0, 1.0], &[3]);
        assert_eq!(a.abs().to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(a.neg().to_vec(), vec![1.0, 0.0, -1.0]);
        assert_eq!(a.clamp(0.0, 0.5).to_vec(), vec![0.0, 0.0, 0.5]);
        let t = a.tanh().to_vec();
        assert!((t[2] - 1.0f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_matmul_2d() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = Tensor::from_f32(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.dims(), &[2, 2]);
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_batched_and_shared() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 1, 2]);
        let b = Tensor::from_f32(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.dims(), &[2, 1, 2]);
        assert_eq!(c.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);

        let b3 = Tensor::from_f32(&[1.0, 1.0, 2.0, 2.0], &[2, 2, 1]);
        let c = a.matmul(&b3).unwrap();
        assert_eq!(c.dims(), &[2, 1, 1]);
        assert_eq!(c.to_vec(), vec![3.0, 14.0]);
    }

    #[test]
    fn test_matmul_transposed_view() {
        let w = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let x = Tensor::from_f32(&[1.0, 1.0], &[1, 2]);
        let y = x.matmul(&w.transpose().unwrap()).unwrap();
        assert_eq!(y.to_vec(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_matvec() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = Tensor::from_f32(&[1.0, 1.0], &[2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.dims(), &[2]);
        assert_eq!(c.to_vec(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_matmul_dim_mismatch() {
        let a = Tensor::ones(&[2, 2]);
        let b = Tensor::ones(&[3, 1]);
        assert!(matches!(a.matmul(&b), Err(ContinuumError::MatmulDimMismatch { .. })));
    }
}

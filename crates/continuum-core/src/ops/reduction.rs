//! Reduction operations: sum, mean, min, max.
//!
//! Per-axis reductions accumulate in ascending index order, so identical
//! inputs always produce bit-identical outputs.

use rayon::prelude::*;

use crate::error::ContinuumError;
use crate::shape::Shape;
use crate::tensor::Tensor;
use crate::Result;

const PAR_THRESHOLD: usize = 8192;

impl Tensor {
    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        let data = self.contiguous_data();
        if data.len() >= PAR_THRESHOLD {
            data.par_iter().sum()
        } else {
            data.iter().sum()
        }
    }

    /// Mean of all elements (`NaN` for an empty tensor).
    pub fn mean(&self) -> f32 {
        self.sum() / self.numel() as f32
    }

    /// Sum along `axis`, removing that dimension.
    pub fn sum_axis(&self, axis: usize) -> Result<Tensor> {
        self.fold_axis(axis, 0.0, |acc, v| acc + v)
    }

    /// Mean along `axis`: the axis sum divided by its length.
    pub fn mean_axis(&self, axis: usize) -> Result<Tensor> {
        let sum = self.sum_axis(axis)?;
        Ok(sum.div_scalar(self.dims()[axis] as f32))
    }

    /// Maximum along `axis`.
    pub fn max_axis(&self, axis: usize) -> Result<Tensor> {
        self.fold_axis(axis, f32::NEG_INFINITY, f32::max)
    }

    /// Minimum along `axis`.
    pub fn min_axis(&self, axis: usize) -> Result<Tensor> {
        self.fold_axis(axis, f32::INFINITY, f32::min)
    }

    fn fold_axis(&self, axis: usize, init: f32, op: impl Fn(f32, f32) -> f32) -> Result<Tensor> {
        let out_shape: Shape = self.shape().remove_axis(axis).ok_or(ContinuumError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })?;

        let dims = self.dims();
        let data = self.contiguous_data();
        let axis_size = dims[axis];
        let outer: usize = dims[..axis].iter().product();
        let inner: usize = dims[axis + 1..].iter().product();

        let mut result = vec![init; outer * inner];
        for o in 0..outer {
            for k in 0..axis_size {
                let src = (o * axis_size + k) * inner;
                let dst = o * inner;
                for i in 0..inner {
                    result[dst + i] = op(result[dst + i], data[src + i]);
                }
            }
        }

        Ok(Tensor::from_parts(result, out_shape))
    }
}

#[cfg(test)]
mod tests {
    use crate::Tensor;

    #[test]
    fn test_sum_mean() {
        let t = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(t.sum(), 10.0);
        assert_eq!(t.mean(), 2.5);
    }

    #[test]
    fn test_sum_large_parallel() {
        let t = Tensor::ones(&[10_000]);
        assert_eq!(t.sum(), 10_000.0);
    }

    #[test]
    fn test_sum_axis() {
        let t = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let s0 = t.sum_axis(0).unwrap();
        assert_eq!(s0.dims(), &[3]);
        assert_eq!(s0.to_vec(), vec![5.0, 7.0, 9.0]);
        let s1 = t.sum_axis(1).unwrap();
        assert_eq!(s1.dims(), &[2]);
        assert_eq!(s1.to_vec(), vec![6.0, 15.0]);
        assert!(t.sum_axis(2).is_err());
    }

    #[test]
    fn test_mean_axis_middle() {
        // (obs=1, sensors=2, channels=2)
        let t = Tensor::from_f32(&[1.0, 10.0, 3.0, 30.0], &[1, 2, 2]);
        let m = t.mean_axis(1).unwrap();
        assert_eq!(m.dims(), &[1, 2]);
        assert_eq!(m.to_vec(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_min_max_axis() {
        let t = Tensor::from_f32(&[1.0, -2.0, 3.0, 0.5], &[2, 2]);
        assert_eq!(t.max_axis(0).unwrap().to_vec(), vec![3.0, 0.5]);
        assert_eq!(t.min_axis(1).unwrap().to_vec(), vec![-2.0, 0.5]);
    }
}

//! Tensor manipulation: cat, index_select, narrow, broadcast_to.

use crate::error::ContinuumError;
use crate::shape::Shape;
use crate::tensor::Tensor;
use crate::Result;

/// Resolve a possibly negative axis against a rank of `ndim`.
pub(crate) fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis < 0 { ndim as isize + axis } else { axis };
    if resolved < 0 || resolved as usize >= ndim {
        return Err(ContinuumError::InvalidAxis {
            axis: axis.unsigned_abs(),
            ndim,
        });
    }
    Ok(resolved as usize)
}

impl Tensor {
    /// Concatenate tensors along a given axis.
    ///
    /// All tensors must have the same shape except along `axis`.
    pub fn cat(tensors: &[&Tensor], axis: isize) -> Result<Tensor> {
        let first = tensors
            .first()
            .ok_or_else(|| ContinuumError::InvalidArgument("cat: empty tensor list".into()))?;
        let ndim = first.ndim();
        if ndim == 0 {
            return Err(ContinuumError::InvalidArgument("cat: cannot concatenate scalars".into()));
        }
        let axis = normalize_axis(axis, ndim)?;

        for t in &tensors[1..] {
            let compatible = t.ndim() == ndim
                && (0..ndim).all(|d| d == axis || t.dims()[d] == first.dims()[d]);
            if !compatible {
                return Err(ContinuumError::ShapeMismatch {
                    expected: first.dims().to_vec(),
                    got: t.dims().to_vec(),
                });
            }
        }

        let mut out_shape: Vec<usize> = first.dims().to_vec();
        let cat_dim: usize = tensors.iter().map(|t| t.dims()[axis]).sum();
        out_shape[axis] = cat_dim;

        let outer: usize = out_shape[..axis].iter().product();
        let inner: usize = out_shape[axis + 1..].iter().product();
        let mut result = vec![0.0f32; out_shape.iter().product()];

        let mut cat_offset = 0;
        for t in tensors {
            let t_data = t.contiguous_data();
            let t_axis = t.dims()[axis];
            for o in 0..outer {
                let src = o * t_axis * inner;
                let dst = (o * cat_dim + cat_offset) * inner;
                let len = t_axis * inner;
                result[dst..dst + len].copy_from_slice(&t_data[src..src + len]);
            }
            cat_offset += t_axis;
        }

        Ok(Tensor::from_parts(result, Shape::from(out_shape)))
    }

    /// Gather sub-tensors along axis 0, in the order given.
    ///
    /// Indices may repeat. Every index must be `< dims[0]`.
    pub fn index_select(&self, indices: &[usize]) -> Result<Tensor> {
        let size = self
            .shape()
            .dim(0)
            .ok_or(ContinuumError::InvalidAxis { axis: 0, ndim: 0 })?;
        let row: usize = self.dims()[1..].iter().product();
        let data = self.contiguous_data();

        let mut result = Vec::with_capacity(indices.len() * row);
        for &index in indices {
            if index >= size {
                return Err(ContinuumError::IndexOutOfBounds { index, axis: 0, size });
            }
            result.extend_from_slice(&data[index * row..(index + 1) * row]);
        }

        let mut out_shape = self.dims().to_vec();
        out_shape[0] = indices.len();
        Ok(Tensor::from_parts(result, Shape::from(out_shape)))
    }

    /// The `len` entries starting at `start` along `axis`, as a copy.
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Tensor> {
        let size = self.shape().dim(axis).ok_or(ContinuumError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })?;
        if start + len > size {
            return Err(ContinuumError::IndexOutOfBounds {
                index: start + len,
                axis,
                size,
            });
        }

        let outer: usize = self.dims()[..axis].iter().product();
        let inner: usize = self.dims()[axis + 1..].iter().product();
        let data = self.contiguous_data();

        let mut result = Vec::with_capacity(outer * len * inner);
        for o in 0..outer {
            let src = (o * size + start) * inner;
            result.extend_from_slice(&data[src..src + len * inner]);
        }

        let mut out_shape = self.dims().to_vec();
        out_shape[axis] = len;
        Ok(Tensor::from_parts(result, Shape::from(out_shape)))
    }

    /// Entry `index` along `axis`, with that axis removed.
    pub fn select(&self, axis: usize, index: usize) -> Result<Tensor> {
        let narrowed = self.narrow(axis, index, 1)?;
        let shape = narrowed.shape().remove_axis(axis).ok_or(ContinuumError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })?;
        narrowed.reshape_to(shape.dims())
    }

    /// Materialize this tensor broadcast to `dims`.
    pub fn broadcast_to(&self, dims: &[usize]) -> Result<Tensor> {
        let target = Shape::new(dims);
        match self.shape().broadcast_with(&target) {
            Some(out) if out == target => {}
            _ => {
                return Err(ContinuumError::BroadcastError {
                    a: self.dims().to_vec(),
                    b: dims.to_vec(),
                })
            }
        }
        Tensor::zeros(dims).add(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ContinuumError, Tensor};

    #[test]
    fn test_cat_axis0() {
        let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = Tensor::from_f32(&[5.0, 6.0], &[1, 2]);
        let c = Tensor::cat(&[&a, &b], 0).unwrap();
        assert_eq!(c.dims(), &[3, 2]);
        assert_eq!(c.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_cat_last_axis() {
        let a = Tensor::from_f32(&[1.0, 2.0], &[2, 1]);
        let b = Tensor::from_f32(&[3.0, 4.0, 5.0, 6.0], &[2, 2]);
        let c = Tensor::cat(&[&a, &b], -1).unwrap();
        assert_eq!(c.dims(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn test_cat_mismatch() {
        let a = Tensor::ones(&[2, 2]);
        let b = Tensor::ones(&[3, 3]);
        assert!(matches!(
            Tensor::cat(&[&a, &b], 0),
            Err(ContinuumError::ShapeMismatch { .. })
        ));
        assert!(Tensor::cat(&[], 0).is_err());
    }

    #[test]
    fn test_index_select_keeps_order() {
        let t = Tensor::from_f32(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5], &[3, 2]);
        let s = t.index_select(&[2, 0, 2]).unwrap();
        assert_eq!(s.dims(), &[3, 2]);
        assert_eq!(s.to_vec(), vec![2.0, 2.5, 0.0, 0.5, 2.0, 2.5]);
        assert!(matches!(
            t.index_select(&[3]),
            Err(ContinuumError::IndexOutOfBounds { index: 3, axis: 0, size: 3 })
        ));
    }

    #[test]
    fn test_narrow_and_select() {
        let t = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let n = t.narrow(1, 1, 2).unwrap();
        assert_eq!(n.dims(), &[2, 2]);
        assert_eq!(n.to_vec(), vec![2.0, 3.0, 5.0, 6.0]);
        assert!(t.narrow(1, 2, 2).is_err());

        let row = t.select(0, 1).unwrap();
        assert_eq!(row.dims(), &[3]);
        assert_eq!(row.to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_broadcast_to() {
        let t = Tensor::from_f32(&[1.0, 2.0], &[2, 1]);
        let b = t.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(b.to_vec(), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert!(t.broadcast_to(&[3, 3]).is_err());
    }
}

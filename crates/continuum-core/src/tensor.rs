use std::fmt;

use rand::Rng;
use smallvec::SmallVec;

use crate::device::Device;
use crate::error::ContinuumError;
use crate::shape::Shape;
use crate::storage::Storage;
use crate::Result;

/// A multi-dimensional f32 array, the data type shared by every Continuum crate.
///
/// Tensors support:
/// - Zero-copy views (reshape, transpose, unsqueeze share storage)
/// - Broadcasting element-wise arithmetic
/// - Deterministic reductions (fixed summation order)
///
/// Random constructors take the RNG explicitly, so reproducibility is decided
/// by the caller (see [`crate::RunConfig::rng`]).
///
/// # Examples
///
/// ```
/// use continuum_core::Tensor;
///
/// let t = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
/// assert_eq!(t.shape().dims(), &[2, 2]);
/// assert_eq!(t.numel(), 4);
///
/// let flat = t.reshape(&[4]).unwrap();
/// assert_eq!(flat.shape().dims(), &[4]);
/// ```
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    shape: Shape,
    strides: SmallVec<[usize; 5]>,
    offset: usize,
}

impl Tensor {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a tensor from f32 data with the given shape.
    ///
    /// # Panics
    /// Panics if `data.len()` does not match the shape. Use [`Tensor::from_vec`]
    /// for a fallible version.
    pub fn from_f32(data: &[f32], shape: &[usize]) -> Self {
        let s = Shape::new(shape);
        assert_eq!(
            s.numel(),
            data.len(),
            "Shape {:?} requires {} elements, got {}",
            shape,
            s.numel(),
            data.len()
        );
        Self::from_parts(data.to_vec(), s)
    }

    /// Take ownership of `data` as a tensor of the given shape.
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let s = Shape::new(shape);
        if s.numel() != data.len() {
            return Err(ContinuumError::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Self::from_parts(data, s))
    }

    /// Build from a buffer whose length is already known to equal `shape.numel()`.
    pub(crate) fn from_parts(data: Vec<f32>, shape: Shape) -> Self {
        debug_assert_eq!(shape.numel(), data.len());
        let strides = shape.contiguous_strides();
        Self {
            storage: Storage::from_vec(data),
            shape,
            strides,
            offset: 0,
        }
    }

    /// Tensor of `shape` filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Tensor of `shape` filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// Tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        let s = Shape::new(shape);
        Self::from_parts(vec![value; s.numel()], s)
    }

    /// Rank-0 tensor holding `value`.
    ///
    /// Broadcasts against any shape.
    pub fn scalar(value: f32) -> Self {
        Self::from_parts(vec![value], Shape::scalar())
    }

    /// `n` evenly spaced points from `start` to `end`, both inclusive.
    ///
    /// Point `i` is `start + i * step`; the last point is pinned to `end`.
    pub fn linspace(start: f32, end: f32, n: usize) -> Self {
        let data: Vec<f32> = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (n - 1) as f32;
                let mut data: Vec<f32> = (0..n).map(|i| start + i as f32 * step).collect();
                data[n - 1] = end;
                data
            }
        };
        Self::from_parts(data, Shape::new(&[n]))
    }

    /// Values drawn uniformly from `[low, high)`.
    pub fn rand_uniform<R: Rng + ?Sized>(shape: &[usize], low: f32, high: f32, rng: &mut R) -> Self {
        let s = Shape::new(shape);
        let data: Vec<f32> = (0..s.numel())
            .map(|_| if low < high { rng.gen_range(low..high) } else { low })
            .collect();
        Self::from_parts(data, s)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Logical shape of this view.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shorthand for `shape().dims()`.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Strides (in elements).
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Whether this tensor is laid out row-major from the start of its storage.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0
            && self.storage.len() == self.numel()
            && self.strides == self.shape.contiguous_strides()
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// The underlying data (contiguous tensors only).
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        self.is_contiguous().then(|| self.storage.as_slice())
    }

    /// Mutable data, copy-on-write (contiguous tensors only).
    pub fn as_f32_slice_mut(&mut self) -> Option<&mut [f32]> {
        if !self.is_contiguous() {
            return None;
        }
        Some(self.storage.as_mut_slice())
    }

    /// All elements in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        match self.as_f32_slice() {
            Some(data) => data.to_vec(),
            None => (0..self.numel())
                .filter_map(|i| self.get_f32(i))
                .collect(),
        }
    }

    /// Element at a row-major flat index.
    pub fn get_f32(&self, flat_index: usize) -> Option<f32> {
        let physical = self.flat_to_physical(flat_index)?;
        self.storage.as_slice().get(physical).copied()
    }

    /// Element at a multi-dimensional index.
    pub fn at(&self, index: &[usize]) -> Result<f32> {
        if index.len() != self.ndim() {
            return Err(ContinuumError::ShapeMismatch {
                expected: self.dims().to_vec(),
                got: index.to_vec(),
            });
        }
        let mut physical = self.offset;
        for (axis, (&i, &size)) in index.iter().zip(self.dims()).enumerate() {
            if i >= size {
                return Err(ContinuumError::IndexOutOfBounds { index: i, axis, size });
            }
            physical += i * self.strides[axis];
        }
        Ok(self.storage.as_slice()[physical])
    }

    fn flat_to_physical(&self, flat_index: usize) -> Option<usize> {
        if flat_index >= self.numel() {
            return None;
        }
        let mut remaining = flat_index;
        let mut physical = self.offset;
        for (i, cs) in self.shape.contiguous_strides().into_iter().enumerate() {
            physical += (remaining / cs) * self.strides[i];
            remaining %= cs;
        }
        Some(physical)
    }

    // =========================================================================
    // Shape operations (zero-copy views)
    // =========================================================================

    /// Reshape the tensor. Zero-copy when contiguous, copies otherwise.
    pub fn reshape(&self, new_shape: &[isize]) -> Result<Tensor> {
        let resolved = self.shape.resolve_reshape(new_shape).ok_or_else(|| {
            ContinuumError::InvalidReshape {
                numel: self.numel(),
                shape: new_shape.to_vec(),
            }
        })?;
        let base = self.contiguous();
        let strides = resolved.contiguous_strides();
        Ok(Tensor {
            storage: base.storage,
            shape: resolved,
            strides,
            offset: 0,
        })
    }

    /// Reshape to a fully known shape.
    pub fn reshape_to(&self, dims: &[usize]) -> Result<Tensor> {
        let target: SmallVec<[isize; 5]> = dims.iter().map(|&d| d as isize).collect();
        self.reshape(&target)
    }

    /// Insert a unit axis at `axis` (zero-copy).
    pub fn unsqueeze(&self, axis: usize) -> Result<Tensor> {
        let shape = self.shape.unsqueeze(axis).ok_or(ContinuumError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })?;
        let mut strides = self.strides.clone();
        // A unit axis never advances; pick the stride that keeps contiguous views contiguous.
        let stride = if axis < self.ndim() {
            self.strides[axis] * self.dims()[axis]
        } else {
            1
        };
        strides.insert(axis, stride);
        Ok(Tensor {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Transpose the last two dimensions (zero-copy view).
    pub fn transpose(&self) -> Result<Tensor> {
        let shape = self.shape.transpose().ok_or(ContinuumError::InvalidAxis {
            axis: 0,
            ndim: self.ndim(),
        })?;
        let ndim = self.ndim();
        let mut strides = self.strides.clone();
        strides.swap(ndim - 2, ndim - 1);
        Ok(Tensor {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// A row-major copy, or a cheap clone when already contiguous.
    pub fn contiguous(&self) -> Tensor {
        if self.is_contiguous() {
            return self.clone();
        }
        let data: Vec<f32> = (0..self.numel())
            .filter_map(|i| self.get_f32(i))
            .collect();
        Self::from_parts(data, self.shape.clone())
    }

    /// Row-major data, borrowed when possible.
    pub(crate) fn contiguous_data(&self) -> std::borrow::Cow<'_, [f32]> {
        match self.as_f32_slice() {
            Some(data) => std::borrow::Cow::Borrowed(data),
            None => std::borrow::Cow::Owned(self.to_vec()),
        }
    }
}

impl PartialEq for Tensor {
    /// Same shape and element-wise equal values (`NaN != NaN`).
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.contiguous_data() == other.contiguous_data()
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(shape={}, device={}, contiguous={})",
            self.shape,
            self.device(),
            self.is_contiguous(),
        )
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.contiguous_data();
        if data.len() <= 20 {
            write!(f, "tensor({:?}, shape={})", &data[..], self.shape)
        } else {
            write!(
                f,
                "tensor([{:.4}, {:.4}, ..., {:.4}], shape={})",
                data[0],
                data[1],
                data[data.len() - 1],
                self.shape
            )
        }
    }
}

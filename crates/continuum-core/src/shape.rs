use smallvec::SmallVec;
use std::fmt;

/// Dimensions of a tensor, stored inline for up to 5 axes.
///
/// Kernel-value tensors are 5-D (observations, sensors, queries, in, out),
/// so that is the largest rank kept off the heap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; 5]>,
}

impl Shape {
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(dims),
        }
    }

    /// Scalar shape (0 dimensions).
    pub fn scalar() -> Self {
        Self {
            dims: SmallVec::new(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements. A scalar holds one.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Size of one axis, `None` past the rank.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Row-major strides (in elements).
    pub fn contiguous_strides(&self) -> SmallVec<[usize; 5]> {
        let mut strides: SmallVec<[usize; 5]> = SmallVec::from_elem(1usize, self.dims.len());
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Numpy-style broadcast of two shapes, aligned on trailing axes.
    pub fn broadcast_with(&self, other: &Shape) -> Option<Shape> {
        let rank = self.ndim().max(other.ndim());
        let pad = |s: &Shape, i: usize| {
            let offset = rank - s.ndim();
            if i < offset {
                1
            } else {
                s.dims[i - offset]
            }
        };

        let mut dims = SmallVec::with_capacity(rank);
        for i in 0..rank {
            let (a, b) = (pad(self, i), pad(other, i));
            match (a, b) {
                _ if a == b => dims.push(a),
                (1, _) => dims.push(b),
                (_, 1) => dims.push(a),
                _ => return None,
            }
        }
        Some(Shape { dims })
    }

    /// Resolve a reshape target with at most one inferred (`-1`) axis.
    pub fn resolve_reshape(&self, target: &[isize]) -> Option<Shape> {
        let numel = self.numel();
        let mut inferred = None;
        let mut known: usize = 1;

        for (i, &d) in target.iter().enumerate() {
            match d {
                -1 if inferred.is_none() => inferred = Some(i),
                d if d >= 0 => known = known.checked_mul(d as usize)?,
                _ => return None,
            }
        }

        let mut dims: SmallVec<[usize; 5]> = target.iter().map(|&d| d.max(0) as usize).collect();
        if let Some(idx) = inferred {
            if known == 0 || numel % known != 0 {
                return None;
            }
            dims[idx] = numel / known;
        }

        let shape = Shape { dims };
        (shape.numel() == numel).then_some(shape)
    }

    /// Shape with the last two axes swapped.
    pub fn transpose(&self) -> Option<Shape> {
        if self.ndim() < 2 {
            return None;
        }
        let mut dims = self.dims.clone();
        let n = dims.len();
        dims.swap(n - 2, n - 1);
        Some(Shape { dims })
    }

    /// Shape with a unit axis inserted at `axis` (`axis <= ndim`).
    pub fn unsqueeze(&self, axis: usize) -> Option<Shape> {
        if axis > self.ndim() {
            return None;
        }
        let mut dims = self.dims.clone();
        dims.insert(axis, 1);
        Some(Shape { dims })
    }

    /// Shape with `axis` removed.
    pub fn remove_axis(&self, axis: usize) -> Option<Shape> {
        if axis >= self.ndim() {
            return None;
        }
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Some(Shape { dims })
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims.as_slice())
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape {
            dims: SmallVec::from_vec(dims),
        }
    }
}

macro_rules! impl_shape_from_array {
    ($($n:expr),*) => {
        $(
            impl From<[usize; $n]> for Shape {
                fn from(dims: [usize; $n]) -> Self {
                    Shape::new(&dims)
                }
            }
        )*
    };
}

impl_shape_from_array!(0, 1, 2, 3, 4, 5, 6);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let s = Shape::scalar();
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.numel(), 1);
        assert!(s.is_scalar());
    }

    #[test]
    fn test_kernel_rank_shape() {
        let s = Shape::new(&[8, 10, 20, 4, 1]);
        assert_eq!(s.ndim(), 5);
        assert_eq!(s.numel(), 6400);
        assert_eq!(s.dim(2), Some(20));
        assert_eq!(s.dim(5), None);
        assert_eq!(s.contiguous_strides().as_slice(), &[800, 80, 4, 1, 1]);
    }

    #[test]
    fn test_broadcast_pairwise() {
        // (obs, sensors, 1, d) against (obs, 1, queries, d)
        let a = Shape::new(&[2, 3, 1, 1]);
        let b = Shape::new(&[2, 1, 5, 1]);
        assert_eq!(a.broadcast_with(&b).unwrap().dims(), &[2, 3, 5, 1]);

        let a = Shape::new(&[2, 3]);
        let b = Shape::new(&[3]);
        assert_eq!(a.broadcast_with(&b).unwrap().dims(), &[2, 3]);

        let a = Shape::new(&[2, 3]);
        let b = Shape::new(&[4, 3]);
        assert!(a.broadcast_with(&b).is_none());
    }

    #[test]
    fn test_reshape() {
        let s = Shape::new(&[2, 3, 4]);
        assert_eq!(s.resolve_reshape(&[6, 4]).unwrap().dims(), &[6, 4]);
        assert_eq!(s.resolve_reshape(&[-1, 4]).unwrap().dims(), &[6, 4]);
        assert_eq!(s.resolve_reshape(&[2, -1]).unwrap().dims(), &[2, 12]);
        assert!(s.resolve_reshape(&[-1, -1]).is_none());
        assert!(s.resolve_reshape(&[5, 5]).is_none());
    }

    #[test]
    fn test_unsqueeze_and_remove() {
        let s = Shape::new(&[4, 10, 2]);
        assert_eq!(s.unsqueeze(2).unwrap().dims(), &[4, 10, 1, 2]);
        assert_eq!(s.unsqueeze(3).unwrap().dims(), &[4, 10, 2, 1]);
        assert!(s.unsqueeze(4).is_none());
        assert_eq!(s.remove_axis(0).unwrap().dims(), &[10, 2]);
        assert!(s.remove_axis(3).is_none());
    }

    #[test]
    fn test_transpose() {
        let s = Shape::new(&[2, 3, 4]);
        assert_eq!(s.transpose().unwrap().dims(), &[2, 4, 3]);
        assert!(Shape::new(&[5]).transpose().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(&[8, 20, 1]).to_string(), "[8, 20, 1]");
        let s: Shape = [2, 3].into();
        assert_eq!(s.dims(), &[2, 3]);
    }
}

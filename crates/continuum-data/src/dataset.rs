//! OperatorDataset — validated collection of operator-learning observations.
//!
//! Each observation is a tuple `(x, u, y, v)`:
//! - `x`: sensor coordinates `[sensors, coordinate_dim]`
//! - `u`: sensor values `[sensors, input_channels]`
//! - `y`: query coordinates `[queries, coordinate_dim]`
//! - `v`: target values `[queries, output_channels]`
//!
//! The data set stores the four roles batched along a leading observation
//! axis and never mutates them after construction.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use continuum_core::{ContinuumError, Result, Tensor};
use tracing::debug;

use crate::shape::{DatasetShapes, TensorShape};
use crate::transform::{Role, Transform};

/// A single observation with the observation axis removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub x: Tensor,
    pub u: Tensor,
    pub y: Tensor,
    pub v: Tensor,
}

/// Observations batched along a leading axis.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorBatch {
    pub x: Tensor,
    pub u: Tensor,
    pub y: Tensor,
    pub v: Tensor,
}

impl OperatorBatch {
    /// Number of observations in the batch.
    pub fn len(&self) -> usize {
        self.x.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Default)]
struct RoleTransforms {
    x: Option<Arc<dyn Transform>>,
    u: Option<Arc<dyn Transform>>,
    y: Option<Arc<dyn Transform>>,
    v: Option<Arc<dyn Transform>>,
}

impl RoleTransforms {
    fn slot(&mut self, role: Role) -> &mut Option<Arc<dyn Transform>> {
        match role {
            Role::X => &mut self.x,
            Role::U => &mut self.u,
            Role::Y => &mut self.y,
            Role::V => &mut self.v,
        }
    }

    fn get(&self, role: Role) -> Option<&Arc<dyn Transform>> {
        match role {
            Role::X => self.x.as_ref(),
            Role::U => self.u.as_ref(),
            Role::Y => self.y.as_ref(),
            Role::V => self.v.as_ref(),
        }
    }

    fn apply(&self, role: Role, tensor: Tensor) -> Result<Tensor> {
        match self.get(role) {
            Some(t) => t.forward(&tensor),
            None => Ok(tensor),
        }
    }
}

/// Finite, indexable collection of `(x, u, y, v)` observations.
///
/// Cloning is cheap: tensors share their storage.
#[derive(Clone)]
pub struct OperatorDataset {
    x: Tensor,
    u: Tensor,
    y: Tensor,
    v: Tensor,
    shapes: DatasetShapes,
    transforms: RoleTransforms,
}

impl OperatorDataset {
    /// Build a data set from four rank-3 tensors with a shared leading
    /// observation axis.
    ///
    /// Fails with `RoleMismatch` when observation counts differ, when `x` and
    /// `u` disagree on the number of sensors, or when `y` and `v` disagree on
    /// the number of queries.
    pub fn new(x: Tensor, u: Tensor, y: Tensor, v: Tensor) -> Result<Self> {
        let roles = [("x", &x), ("u", &u), ("y", &y), ("v", &v)];
        for (_, t) in &roles {
            if t.ndim() != 3 {
                return Err(ContinuumError::ShapeMismatch {
                    expected: vec![0, 0, 0],
                    got: t.dims().to_vec(),
                });
            }
        }
        let n = x.dims()[0];
        for (name, t) in &roles[1..] {
            if t.dims()[0] != n {
                return Err(ContinuumError::roles("x", x.dims(), *name, t.dims()));
            }
        }
        if x.dims()[1] != u.dims()[1] {
            return Err(ContinuumError::roles("x", x.dims(), "u", u.dims()));
        }
        if y.dims()[1] != v.dims()[1] {
            return Err(ContinuumError::roles("y", y.dims(), "v", v.dims()));
        }

        let shapes = DatasetShapes::new(
            n,
            TensorShape::of_role(x.dims())?,
            TensorShape::of_role(u.dims())?,
            TensorShape::of_role(y.dims())?,
            TensorShape::of_role(v.dims())?,
        )?;
        debug!(%shapes, "operator data set created");

        Ok(Self {
            x: x.contiguous(),
            u: u.contiguous(),
            y: y.contiguous(),
            v: v.contiguous(),
            shapes,
            transforms: RoleTransforms::default(),
        })
    }

    /// Attach a transform applied to `role` whenever observations are read.
    pub fn with_transform(mut self, role: Role, transform: Arc<dyn Transform>) -> Self {
        *self.transforms.slot(role) = Some(transform);
        self
    }

    pub fn transform(&self, role: Role) -> Option<&Arc<dyn Transform>> {
        self.transforms.get(role)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.shapes.num_observations()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shape contract every observation satisfies.
    pub fn shapes(&self) -> &DatasetShapes {
        &self.shapes
    }

    /// Raw sensor coordinates `[observations, sensors, coordinate_dim]`.
    pub fn x(&self) -> &Tensor {
        &self.x
    }

    /// Raw sensor values.
    pub fn u(&self) -> &Tensor {
        &self.u
    }

    /// Raw query coordinates.
    pub fn y(&self) -> &Tensor {
        &self.y
    }

    /// Raw target values.
    pub fn v(&self) -> &Tensor {
        &self.v
    }

    /// Observation `index` with the observation axis removed.
    pub fn get(&self, index: usize) -> Result<Observation> {
        if index >= self.len() {
            return Err(ContinuumError::IndexOutOfBounds {
                index,
                axis: 0,
                size: self.len(),
            });
        }
        Ok(Observation {
            x: self.transforms.apply(Role::X, self.x.select(0, index)?)?,
            u: self.transforms.apply(Role::U, self.u.select(0, index)?)?,
            y: self.transforms.apply(Role::Y, self.y.select(0, index)?)?,
            v: self.transforms.apply(Role::V, self.v.select(0, index)?)?,
        })
    }

    /// The observations at `indices`, in the given order. Duplicates are kept.
    pub fn select(&self, indices: &[usize]) -> Result<OperatorBatch> {
        let raw = self.select_raw(indices)?;
        Ok(OperatorBatch {
            x: self.transforms.apply(Role::X, raw.x)?,
            u: self.transforms.apply(Role::U, raw.u)?,
            y: self.transforms.apply(Role::Y, raw.y)?,
            v: self.transforms.apply(Role::V, raw.v)?,
        })
    }

    /// The observations in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<OperatorBatch> {
        if range.start > range.end || range.end > self.len() {
            return Err(ContinuumError::IndexOutOfBounds {
                index: range.end,
                axis: 0,
                size: self.len(),
            });
        }
        let indices: Vec<usize> = range.collect();
        self.select(&indices)
    }

    /// A new data set holding the untransformed observations at `indices`,
    /// sharing this data set's transforms.
    pub fn subset(&self, indices: &[usize]) -> Result<OperatorDataset> {
        let raw = self.select_raw(indices)?;
        let mut subset = OperatorDataset::new(raw.x, raw.u, raw.y, raw.v)?;
        subset.transforms = self.transforms.clone();
        Ok(subset)
    }

    /// Join data sets along the observation axis.
    ///
    /// All inputs must agree on every per-observation role shape. The result
    /// keeps the transforms of the first data set.
    pub fn concat(datasets: &[&OperatorDataset]) -> Result<OperatorDataset> {
        let first = datasets
            .first()
            .ok_or_else(|| ContinuumError::InvalidArgument("concat of zero data sets".into()))?;
        for other in &datasets[1..] {
            if !first.shapes.same_roles(&other.shapes) {
                let (a, b) = (first.shapes, other.shapes);
                let role = [
                    ("x", a.x(), b.x()),
                    ("u", a.u(), b.u()),
                    ("y", a.y(), b.y()),
                    ("v", a.v(), b.v()),
                ]
                .into_iter()
                .find(|(_, lhs, rhs)| lhs != rhs);
                if let Some((name, lhs, rhs)) = role {
                    return Err(ContinuumError::roles(
                        name,
                        &[lhs.num(), lhs.dim()],
                        name,
                        &[rhs.num(), rhs.dim()],
                    ));
                }
            }
        }

        let join = |pick: fn(&OperatorDataset) -> &Tensor| -> Result<Tensor> {
            let parts: Vec<&Tensor> = datasets.iter().map(|d| pick(d)).collect();
            Tensor::cat(&parts, 0)
        };
        let mut joined = OperatorDataset::new(
            join(|d| &d.x)?,
            join(|d| &d.u)?,
            join(|d| &d.y)?,
            join(|d| &d.v)?,
        )?;
        joined.transforms = first.transforms.clone();
        Ok(joined)
    }

    fn select_raw(&self, indices: &[usize]) -> Result<OperatorBatch> {
        Ok(OperatorBatch {
            x: self.x.index_select(indices)?,
            u: self.u.index_select(indices)?,
            y: self.y.index_select(indices)?,
            v: self.v.index_select(indices)?,
        })
    }
}

impl fmt::Debug for OperatorDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDataset")
            .field("shapes", &self.shapes)
            .field("transformed", &Role::ALL.map(|r| self.transforms.get(r).is_some()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Normalize;

    /// Observation `i` is filled with `i` in x and u, `-i` in y and v.
    fn make_dataset(n: usize) -> OperatorDataset {
        let fill = |sign: f32, per: usize| -> Vec<f32> {
            (0..n).flat_map(|i| std::iter::repeat(sign * i as f32).take(per)).collect()
        };
        OperatorDataset::new(
            Tensor::from_f32(&fill(1.0, 3 * 2), &[n, 3, 2]),
            Tensor::from_f32(&fill(1.0, 3), &[n, 3, 1]),
            Tensor::from_f32(&fill(-1.0, 4 * 2), &[n, 4, 2]),
            Tensor::from_f32(&fill(-1.0, 4 * 2), &[n, 4, 2]),
        )
        .unwrap()
    }

    #[test]
    fn test_shapes_are_derived() {
        let ds = make_dataset(5);
        let s = ds.shapes();
        assert_eq!(ds.len(), 5);
        assert!(!ds.is_empty());
        assert_eq!((s.x().num(), s.x().dim()), (3, 2));
        assert_eq!((s.u().num(), s.u().dim()), (3, 1));
        assert_eq!((s.y().num(), s.y().dim()), (4, 2));
        assert_eq!((s.v().num(), s.v().dim()), (4, 2));
    }

    #[test]
    fn test_observation_count_mismatch() {
        let err = OperatorDataset::new(
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[3, 4, 1]),
            Tensor::zeros(&[2, 4, 1]),
        )
        .unwrap_err();
        assert!(matches!(err, ContinuumError::RoleMismatch { lhs: "x", rhs: "y", .. }));
    }

    #[test]
    fn test_sensor_count_mismatch() {
        let err = OperatorDataset::new(
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[2, 5, 1]),
            Tensor::zeros(&[2, 4, 1]),
            Tensor::zeros(&[2, 4, 1]),
        )
        .unwrap_err();
        assert!(matches!(err, ContinuumError::RoleMismatch { lhs: "x", rhs: "u", .. }));
    }

    #[test]
    fn test_query_count_mismatch() {
        let err = OperatorDataset::new(
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[2, 4, 1]),
            Tensor::zeros(&[2, 6, 1]),
        )
        .unwrap_err();
        assert!(matches!(err, ContinuumError::RoleMismatch { lhs: "y", rhs: "v", .. }));
    }

    #[test]
    fn test_rank_is_checked() {
        let r = OperatorDataset::new(
            Tensor::zeros(&[2, 3]),
            Tensor::zeros(&[2, 3, 1]),
            Tensor::zeros(&[2, 4, 1]),
            Tensor::zeros(&[2, 4, 1]),
        );
        assert!(matches!(r, Err(ContinuumError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_get_removes_observation_axis() {
        let ds = make_dataset(4);
        let obs = ds.get(2).unwrap();
        assert_eq!(obs.x.dims(), &[3, 2]);
        assert_eq!(obs.u.dims(), &[3, 1]);
        assert_eq!(obs.y.dims(), &[4, 2]);
        assert_eq!(obs.v.dims(), &[4, 2]);
        assert!(obs.x.to_vec().iter().all(|&v| v == 2.0));
        assert!(obs.v.to_vec().iter().all(|&v| v == -2.0));
    }

    #[test]
    fn test_get_out_of_range() {
        let ds = make_dataset(3);
        assert_eq!(
            ds.get(3).unwrap_err(),
            ContinuumError::IndexOutOfBounds { index: 3, axis: 0, size: 3 }
        );
    }

    #[test]
    fn test_select_preserves_order() {
        let ds = make_dataset(5);
        let batch = ds.select(&[4, 0, 4, 2]).unwrap();
        assert_eq!(batch.len(), 4);
        let firsts: Vec<f32> = (0..4).map(|i| batch.u.at(&[i, 0, 0]).unwrap()).collect();
        assert_eq!(firsts, vec![4.0, 0.0, 4.0, 2.0]);
        assert!(ds.select(&[5]).is_err());
    }

    #[test]
    fn test_slice() {
        let ds = make_dataset(5);
        let batch = ds.slice(1..3).unwrap();
        assert_eq!(batch.x.dims(), &[2, 3, 2]);
        assert_eq!(batch.y.at(&[1, 0, 0]).unwrap(), -2.0);
        assert!(ds.slice(3..6).is_err());
        assert!(ds.slice(2..2).unwrap().is_empty());
    }

    #[test]
    fn test_concat() {
        let a = make_dataset(2);
        let b = make_dataset(3);
        let joined = OperatorDataset::concat(&[&a, &b]).unwrap();
        assert_eq!(joined.len(), 5);
        assert_eq!(joined.get(4).unwrap(), b.get(2).unwrap());

        let other = OperatorDataset::new(
            Tensor::zeros(&[1, 3, 2]),
            Tensor::zeros(&[1, 3, 1]),
            Tensor::zeros(&[1, 7, 2]),
            Tensor::zeros(&[1, 7, 2]),
        )
        .unwrap();
        assert!(matches!(
            OperatorDataset::concat(&[&a, &other]),
            Err(ContinuumError::RoleMismatch { lhs: "y", .. })
        ));
        assert!(OperatorDataset::concat(&[]).is_err());
    }

    #[test]
    fn test_transform_applies_on_read_only() {
        let ds = make_dataset(3);
        let norm = Normalize::new(Tensor::from_f32(&[1.0], &[1]), Tensor::from_f32(&[2.0], &[1])).unwrap();
        let ds = ds.with_transform(Role::U, Arc::new(norm));

        // observation 2: u = 2 -> (2 - 1) / 2
        let obs = ds.get(2).unwrap();
        assert!(obs.u.to_vec().iter().all(|&v| v == 0.5));
        assert!(obs.x.to_vec().iter().all(|&v| v == 2.0));

        let batch = ds.select(&[2]).unwrap();
        assert_eq!(batch.u.at(&[0, 0, 0]).unwrap(), 0.5);

        // Raw data and shapes are untouched.
        assert_eq!(ds.u().at(&[2, 0, 0]).unwrap(), 2.0);
        assert_eq!(ds.shapes().u().dim(), 1);
        assert!(ds.transform(Role::U).is_some());
        assert!(ds.transform(Role::V).is_none());
    }

    #[test]
    fn test_subset_keeps_transforms() {
        let norm = Normalize::new(Tensor::zeros(&[1]), Tensor::full(&[1], 2.0)).unwrap();
        let ds = make_dataset(4).with_transform(Role::U, Arc::new(norm));
        let sub = ds.subset(&[3, 1]).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.u().at(&[0, 0, 0]).unwrap(), 3.0);
        assert_eq!(sub.get(0).unwrap().u.at(&[0, 0]).unwrap(), 1.5);
    }
}

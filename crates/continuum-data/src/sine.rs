//! Sine-wave data set.

use std::f64::consts::PI;

use continuum_core::{ContinuumError, Result, Tensor};

use crate::dataset::OperatorDataset;

/// Sine waves sampled at `num_sensors` evenly spaced sensors in `[-1, 1]`.
///
/// Observation `k` of `size` is `u(x) = sin(w_k π x)` with
/// `w_k = 1 + k / (size - 1)`, so frequencies run from 1 to 2. The queries
/// are the sensors themselves (`y = x`, `v = u`), which makes the data set
/// self-supervised. Coordinate dimension and channel count are both 1.
#[derive(Clone, Debug)]
pub struct Sine {
    num_sensors: usize,
    size: usize,
    dataset: OperatorDataset,
}

impl Sine {
    /// Fails when either count is zero.
    pub fn new(num_sensors: usize, size: usize) -> Result<Self> {
        if num_sensors == 0 || size == 0 {
            return Err(ContinuumError::InvalidArgument(format!(
                "sine data set needs sensors and observations, got num_sensors={num_sensors}, size={size}"
            )));
        }

        let grid = Tensor::linspace(-1.0, 1.0, num_sensors);
        let grid_values = grid.to_vec();

        let mut x = Vec::with_capacity(size * num_sensors);
        let mut u = Vec::with_capacity(size * num_sensors);
        for k in 0..size {
            let w = Self::frequency(k, size);
            x.extend_from_slice(&grid_values);
            u.extend(grid_values.iter().map(|&xi| (w * PI * xi as f64).sin() as f32));
        }

        let x = Tensor::from_vec(x, &[size, num_sensors, 1])?;
        let u = Tensor::from_vec(u, &[size, num_sensors, 1])?;
        let dataset = OperatorDataset::new(x.clone(), u.clone(), x, u)?;
        Ok(Self { num_sensors, size, dataset })
    }

    /// Frequency factor `w_k` of observation `k`.
    pub fn frequency(k: usize, size: usize) -> f64 {
        if size <= 1 {
            1.0
        } else {
            1.0 + k as f64 / (size - 1) as f64
        }
    }

    pub fn num_sensors(&self) -> usize {
        self.num_sensors
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dataset(&self) -> &OperatorDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> OperatorDataset {
        self.dataset
    }
}

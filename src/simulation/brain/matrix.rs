//! Dense matrix with shape-checked operations.
//!
//! Thin wrapper around [`ndarray::Array2`]. Every operation that combines two
//! matrices validates shapes first and returns
//! [`SimulationError::ShapeMismatch`] instead of panicking.

use ndarray::{Array2, Zip};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::error::{Result, SimulationError};

/// A dense `rows x cols` matrix of `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Array2<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Matrix with entries drawn uniformly from `[-scale, scale)`.
    pub fn random(rows: usize, cols: usize, scale: f64) -> Self {
        if scale <= 0.0 {
            return Self::zeros(rows, cols);
        }
        Self {
            data: Array2::random((rows, cols), Uniform::new(-scale, scale)),
        }
    }

    /// Wraps an existing array.
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Column vector (`values.len() x 1`).
    pub fn from_column(values: &[f64]) -> Self {
        let data = Array2::from_shape_fn((values.len(), 1), |(r, _)| values[r]);
        Self { data }
    }

    /// Entries in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Matrix product `self * other`. Requires `self.cols == other.rows`.
    pub fn mult(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols() != other.rows() {
            return Err(SimulationError::ShapeMismatch {
                op: "mult",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self {
            data: self.data.dot(&other.data),
        })
    }

    /// Rows and columns swapped.
    pub fn transpose(&self) -> Matrix {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    fn check_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(SimulationError::ShapeMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            })
        }
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "add")?;
        Ok(Self {
            data: &self.data + &other.data,
        })
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "sub")?;
        Ok(Self {
            data: &self.data - &other.data,
        })
    }

    /// Element-wise product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "hadamard")?;
        Ok(Self {
            data: &self.data * &other.data,
        })
    }

    /// In-place element-wise sum.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "add_assign")?;
        self.data += &other.data;
        Ok(())
    }

    /// Multiplies every entry by `factor`.
    pub fn scale(&self, factor: f64) -> Matrix {
        Self {
            data: &self.data * factor,
        }
    }

    /// Applies `f` to every entry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// Picks every entry from either parent with equal probability.
    pub fn crossover<R: Rng>(a: &Matrix, b: &Matrix, rng: &mut R) -> Result<Matrix> {
        a.check_same_shape(b, "crossover")?;
        let data = Zip::from(&a.data)
            .and(&b.data)
            .map_collect(|&x, &y| if rng.random_bool(0.5) { x } else { y });
        Ok(Self { data })
    }

    /// Adds a uniform offset in `[-range, range]` to each entry with probability `chance`.
    pub fn ranged_mutate<R: Rng>(&mut self, chance: f64, range: f64, rng: &mut R) {
        if range <= 0.0 || chance <= 0.0 {
            return;
        }
        self.data.mapv_inplace(|v| {
            if rng.random::<f64>() < chance {
                v + rng.random_range(-range..=range)
            } else {
                v
            }
        });
    }

    /// Scales each entry by a random factor in `[1 - percent, 1 + percent]`
    /// with probability `chance`.
    pub fn percentage_mutate<R: Rng>(&mut self, chance: f64, percent: f64, rng: &mut R) {
        if percent <= 0.0 || chance <= 0.0 {
            return;
        }
        self.data.mapv_inplace(|v| {
            if rng.random::<f64>() < chance {
                v + v * rng.random_range(-percent..=percent)
            } else {
                v
            }
        });
    }
}

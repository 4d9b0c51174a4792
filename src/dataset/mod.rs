//! Dataset ownership and array persistence

pub mod npy;

use std::path::Path;

use ndarray::{Array1, Array2};

use crate::error::{Result, WagecastError};

/// File name of the persisted feature matrix
pub const X_FILE: &str = "x_data.npy";
/// File name of the persisted target vector
pub const Y_FILE: &str = "y_data.npy";

/// A pipeline run's output: dense feature matrix X and target vector y.
/// Immutable after construction; `y.len() == x.nrows()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Dataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if y.len() != x.nrows() {
            return Err(WagecastError::SchemaError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn feature_width(&self) -> usize {
        self.x.ncols()
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.x, self.y)
    }

    /// Write `x_data.npy` and `y_data.npy` into the directory
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        npy::write_matrix(dir.join(X_FILE), &self.x)?;
        npy::write_vector(dir.join(Y_FILE), &self.y)?;
        Ok(())
    }

    /// Read a dataset previously written by [`Dataset::save`]
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::load_parts(dir.join(X_FILE), dir.join(Y_FILE))
    }

    /// Read a dataset from explicit array file paths
    pub fn load_parts(x_path: impl AsRef<Path>, y_path: impl AsRef<Path>) -> Result<Self> {
        let x = npy::read_matrix(x_path)?;
        let y = npy::read_vector(y_path)?;
        Self::new(x, y)
    }
}

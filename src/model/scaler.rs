//! Feature standardization
//!
//! Per-column zero-mean unit-scale transform. Stats are fit once on training
//! data and reapplied verbatim at inference; a zero-variance column clamps
//! its scale to 1.0 so the transform stays finite.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WagecastError};

/// Standard deviations below this are treated as zero variance
const MIN_SCALE: f64 = 1e-12;

/// Fitted per-feature (mean, scale) statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Compute per-column mean and population standard deviation
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(WagecastError::DataError(
                "cannot standardize an empty matrix".to_string(),
            ));
        }

        let mean = x.mean_axis(Axis(0)).unwrap();
        let n = x.nrows() as f64;
        let mut scale = Array1::zeros(x.ncols());
        for (j, &m) in mean.iter().enumerate() {
            let variance = x.column(j).iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / n;
            let std = variance.sqrt();
            scale[j] = if std < MIN_SCALE { 1.0 } else { std };
        }

        Ok(Self { mean, scale })
    }

    /// `x'[i,j] = (x[i,j] - mean[j]) / scale[j]`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(WagecastError::SchemaError {
                expected: format!("{} features", self.mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let mean_row = self.mean.view().insert_axis(Axis(0));
        let scale_row = self.scale.view().insert_axis(Axis(0));
        Ok((x - &mean_row) / &scale_row)
    }

    /// Fit on `x` and transform it in one step (training only)
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let transformed = scaler.transform(x)?;
        Ok((scaler, transformed))
    }

    /// Rebuild a scaler from persisted stats
    pub fn from_stats(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(WagecastError::SchemaError {
                expected: format!("{} scales", mean.len()),
                actual: format!("{} scales", scale.len()),
            });
        }
        if scale.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(WagecastError::DataError(
                "standardization scales must be positive and finite".to_string(),
            ));
        }
        Ok(Self { mean, scale })
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Number of features the stats were fit on
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn into_stats(self) -> (Array1<f64>, Array1<f64>) {
        (self.mean, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_centers_and_scales() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (scaler, transformed) = StandardScaler::fit_transform(&x).unwrap();

        for j in 0..2 {
            let col = transformed.column(j);
            let mean: f64 = col.iter().sum::<f64>() / col.len() as f64;
            let var: f64 = col.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>()
                / col.len() as f64;
            assert!(mean.abs() < 1e-10, "column {} mean = {}", j, mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-10, "column {} std = {}", j, var.sqrt());
        }
        assert_eq!(scaler.width(), 2);
    }

    #[test]
    fn test_zero_variance_column_clamps() {
        let x = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (scaler, transformed) = StandardScaler::fit_transform(&x).unwrap();

        assert_eq!(scaler.scale()[0], 1.0);
        // Constant column maps to a constant zero, not NaN.
        for &v in transformed.column(0) {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        let wider = array![[1.0, 2.0, 3.0]];
        let err = scaler.transform(&wider).unwrap_err();
        assert!(matches!(err, WagecastError::SchemaError { .. }));
    }

    #[test]
    fn test_from_stats_rejects_bad_scale() {
        let err = StandardScaler::from_stats(array![0.0], array![0.0]).unwrap_err();
        assert!(matches!(err, WagecastError::DataError(_)));
    }

    #[test]
    fn test_empty_matrix() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&x).is_err());
    }
}

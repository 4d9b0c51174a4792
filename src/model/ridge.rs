//! Ridge regression
//!
//! Closed-form L2-regularized least squares over the standardized design.
//! The model standardizes features internally at fit time and keeps the
//! stats, so callers hand it raw feature matrices on both sides. The penalty
//! applies to the weights only, never to the intercept.

use ndarray::{Array1, Array2, Axis};

use crate::error::{Result, WagecastError};
use crate::model::bundle::ModelBundle;
use crate::model::scaler::StandardScaler;

/// Solve the symmetric positive-definite system `A x = b` by Cholesky
/// decomposition. Returns `None` when `A` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve `A x = b` by Gauss-Jordan elimination with partial pivoting.
/// Fallback for systems Cholesky cannot handle; returns `None` on a
/// (numerically) singular pivot.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut pivot_row = col;
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > aug[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if aug[[pivot_row, col]].abs() < 1e-10 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[pivot_row, j]];
                aug[[pivot_row, j]] = tmp;
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.column(n).to_owned())
}

/// L2-regularized linear regression with internal feature standardization
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
    scaler: Option<StandardScaler>,
    is_fitted: bool,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: None,
            scaler: None,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// Fit on raw features: standardize, center the target, and solve
    /// `(X'ᵀX' + alpha·I) w = X'ᵀ(y - ȳ)`. A singular system is reported as
    /// `NumericalError`, never as NaN coefficients.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(WagecastError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "regularization strength must be a non-negative number".to_string(),
            });
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 || n_features == 0 {
            return Err(WagecastError::DataError(
                "cannot fit on an empty matrix".to_string(),
            ));
        }
        if y.len() != n_samples {
            return Err(WagecastError::SchemaError {
                expected: format!("{} targets", n_samples),
                actual: format!("{} targets", y.len()),
            });
        }

        let (scaler, xs) = StandardScaler::fit_transform(x)?;
        let y_mean = y.mean().unwrap_or(0.0);
        let y_centered = y - y_mean;

        let mut xtx = xs.t().dot(&xs);
        for i in 0..n_features {
            xtx[[i, i]] += self.alpha;
        }
        let xty = xs.t().dot(&y_centered);

        let coefficients = cholesky_solve(&xtx, &xty)
            .or_else(|| gauss_jordan_solve(&xtx, &xty))
            .ok_or_else(|| {
                WagecastError::NumericalError(format!(
                    "regularized normal equations are singular (alpha = {})",
                    self.alpha
                ))
            })?;

        // Standardized columns are centered, so the intercept reduces to ȳ
        // up to float error; keep the exact form.
        let xs_mean = xs.mean_axis(Axis(0)).unwrap();
        let intercept = y_mean - coefficients.dot(&xs_mean);

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.scaler = Some(scaler);
        self.is_fitted = true;
        Ok(self)
    }

    /// Predict on raw features using the stored standardization stats
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(WagecastError::ModelNotFitted);
        }
        let coefficients = self.coefficients.as_ref().unwrap();
        let scaler = self.scaler.as_ref().unwrap();
        let intercept = self.intercept.unwrap_or(0.0);

        if x.ncols() != coefficients.len() {
            return Err(WagecastError::SchemaError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let xs = scaler.transform(x)?;
        Ok(xs.dot(coefficients) + intercept)
    }

    /// R² score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predicted = self.predict(x)?;
        let y_mean = y.mean().unwrap_or(0.0);
        let ss_res = (&predicted - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - y_mean).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }

    /// Package the fitted parameters for persistence
    pub fn to_bundle(&self) -> Result<ModelBundle> {
        if !self.is_fitted {
            return Err(WagecastError::ModelNotFitted);
        }
        let scaler = self.scaler.as_ref().unwrap();
        Ok(ModelBundle {
            alpha: self.alpha,
            coefficients: self.coefficients.as_ref().unwrap().clone(),
            intercept: self.intercept.unwrap_or(0.0),
            mean: scaler.mean().clone(),
            scale: scaler.scale().clone(),
        })
    }

    /// Restore a fitted model from a persisted bundle
    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        bundle.validate()?;
        let ModelBundle {
            alpha,
            coefficients,
            intercept,
            mean,
            scale,
        } = bundle;
        let scaler = StandardScaler::from_stats(mean, scale)?;
        Ok(Self {
            alpha,
            coefficients: Some(coefficients),
            intercept: Some(intercept),
            scaler: Some(scaler),
            is_fitted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_recovers_linear_relation() {
        // y = 2*x1 + 3*x2 + 1, exactly
        let x = array![
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [3.0, 1.0],
        ];
        let y = array![6.0, 8.0, 9.0, 11.0, 10.0];

        let mut model = RidgeRegression::new(0.0);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8, "predicted {}, expected {}", p, t);
        }
        let r2 = model.score(&x, &y).unwrap();
        assert!(r2 > 0.999999, "R² = {}", r2);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = RidgeRegression::new(1.0);
        let err = model.predict(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, WagecastError::ModelNotFitted));
    }

    #[test]
    fn test_width_mismatch_fails() {
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 4.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = RidgeRegression::new(1.0);
        model.fit(&x, &y).unwrap();

        let err = model.predict(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, WagecastError::SchemaError { .. }));
    }

    #[test]
    fn test_negative_alpha_rejected() {
        let mut model = RidgeRegression::new(-0.5);
        let err = model.fit(&array![[1.0], [2.0]], &array![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, WagecastError::InvalidParameter { .. }));
    }

    #[test]
    fn test_rank_deficient_without_regularization_errors() {
        // Two identical columns: X'ᵀX' is singular at alpha = 0.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [5.0, 5.0]];
        let y = array![1.0, 2.0, 3.0, 5.0];

        let mut model = RidgeRegression::new(0.0);
        let err = model.fit(&x, &y).unwrap_err();
        assert!(matches!(err, WagecastError::NumericalError(_)));

        // Any positive alpha makes the system solvable.
        let mut model = RidgeRegression::new(1.0);
        assert!(model.fit(&x, &y).is_ok());
    }

    #[test]
    fn test_mismatched_target_length() {
        let mut model = RidgeRegression::new(1.0);
        let err = model
            .fit(&array![[1.0], [2.0]], &array![1.0, 2.0, 3.0])
            .unwrap_err();
        assert!(matches!(err, WagecastError::SchemaError { .. }));
    }

    #[test]
    fn test_solvers_agree() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = array![1.0, 2.0];
        let x1 = cholesky_solve(&a, &b).unwrap();
        let x2 = gauss_jordan_solve(&a, &b).unwrap();
        for (u, v) in x1.iter().zip(x2.iter()) {
            assert!((u - v).abs() < 1e-10);
        }
    }
}

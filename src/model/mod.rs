//! Salary regression model
//!
//! Closed-form ridge regression with internal feature standardization, plus
//! the versioned parameter archive that carries a fitted model between the
//! training and prediction entry points.

mod bundle;
mod ridge;
mod scaler;

pub use bundle::{ModelBundle, BUNDLE_VERSION};
pub use ridge::RidgeRegression;
pub use scaler::StandardScaler;

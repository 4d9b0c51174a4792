//! wagecast - salary prediction for job postings
//!
//! Two cooperating subsystems:
//!
//! - [`pipeline`] - a staged record-transformation chain turning raw CSV rows
//!   into a fixed-width feature matrix and salary target vector
//! - [`model`] - closed-form ridge regression with internal feature
//!   standardization and a versioned parameter archive
//!
//! Plus the plumbing between them:
//!
//! - [`dataset`] - array ownership and `.npy` persistence
//! - [`cli`] - thin command-line entry points (`pipeline`, `train`, `predict`)
//! - [`error`] - the crate-wide error taxonomy

pub mod cli;
pub mod dataset;
pub mod error;
pub mod model;
pub mod pipeline;

pub use error::{Result, WagecastError};

/// Re-export of the commonly used types
pub mod prelude {
    pub use crate::dataset::Dataset;
    pub use crate::error::{Result, WagecastError};
    pub use crate::model::{ModelBundle, RidgeRegression, StandardScaler};
    pub use crate::pipeline::{
        FeatureSchema, Pipeline, PipelineMode, PipelineSummary, RawRecord, RecordSource,
    };
}

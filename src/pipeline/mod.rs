//! Record-to-array transformation pipeline
//!
//! Runs every raw record through the fixed stage chain and collects the
//! survivors into dense arrays. Rejections are absorbed and counted; they
//! never abort a run. Records are processed on the rayon pool, but output
//! row order always matches input order.

pub mod record;
pub mod schema;
pub mod stages;

pub use record::{RawRecord, RecordSource};
pub use schema::{CategoricalField, Encoding, FeatureSchema, NumericField, TargetSpec};
pub use stages::{RejectReason, Stage, StageOutcome};

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{Result, WagecastError};
use stages::run_chain;

/// Whether a run builds a training dataset or an inference feature matrix.
/// Training requires a salary target per record; inference does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Training,
    Inference,
}

/// Aggregate accounting for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub rows_in: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// The fixed stage chain bound to one feature schema
#[derive(Debug, Clone)]
pub struct Pipeline {
    schema: FeatureSchema,
}

impl Pipeline {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build a training dataset: feature matrix plus salary target vector.
    /// Records without a usable target are rejected.
    pub fn process(&self, records: &[RawRecord]) -> Result<(Dataset, PipelineSummary)> {
        let (features, targets, summary) = self.run(records, PipelineMode::Training)?;
        let mut y = Vec::with_capacity(targets.len());
        for target in targets {
            // Stage 5 guarantees a target on every accepted training record.
            y.push(target.ok_or_else(|| {
                WagecastError::DataError("accepted training record without target".to_string())
            })?);
        }
        let dataset = Dataset::new(features, Array1::from_vec(y))?;
        Ok((dataset, summary))
    }

    /// Build an inference feature matrix. Salary columns are ignored; records
    /// survive on features alone.
    pub fn process_features(
        &self,
        records: &[RawRecord],
    ) -> Result<(Array2<f64>, PipelineSummary)> {
        let (features, _, summary) = self.run(records, PipelineMode::Inference)?;
        Ok((features, summary))
    }

    fn run(
        &self,
        records: &[RawRecord],
        mode: PipelineMode,
    ) -> Result<(Array2<f64>, Vec<Option<f64>>, PipelineSummary)> {
        let width = self.schema.width();

        let outcomes: Vec<StageOutcome> = records
            .par_iter()
            .map(|record| run_chain(record, &self.schema, mode))
            .collect();

        let mut flat = Vec::with_capacity(records.len() * width);
        let mut targets = Vec::with_capacity(records.len());
        let mut rejected = 0usize;

        for (row, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                StageOutcome::InProgress(acc) => {
                    let (features, target) = acc.finish();
                    flat.extend(features);
                    targets.push(target);
                }
                StageOutcome::Rejected(reason) => {
                    debug!(row, reason = %reason, "record rejected");
                    rejected += 1;
                }
            }
        }

        let accepted = targets.len();
        let features = Array2::from_shape_vec((accepted, width), flat)?;
        let summary = PipelineSummary {
            rows_in: records.len(),
            accepted,
            rejected,
        };
        info!(
            rows_in = summary.rows_in,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "pipeline run complete"
        );
        Ok((features, targets, summary))
    }
}

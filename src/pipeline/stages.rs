//! Fixed transformation stage chain
//!
//! Each stage is a pure function from (accumulator, record, schema, mode) to
//! an outcome: either the enriched accumulator or a rejection carrying the
//! offending column. No stage mutates shared state, so every stage is
//! independently testable and the chain is deterministic by construction.

use std::fmt;

use super::record::RawRecord;
use super::schema::{Encoding, FeatureSchema};
use super::PipelineMode;

/// Why a record was dropped from the run
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// A schema column is absent from the record
    MissingColumn(String),
    /// A required numeric field is empty and has no default
    MissingValue(String),
    /// A numeric field holds text that does not parse
    UnparseableNumber { column: String, value: String },
    /// Neither salary bound yields a target value
    MissingTarget,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingColumn(col) => write!(f, "missing column '{}'", col),
            RejectReason::MissingValue(col) => write!(f, "missing value in required column '{}'", col),
            RejectReason::UnparseableNumber { column, value } => {
                write!(f, "unparseable number '{}' in column '{}'", value, column)
            }
            RejectReason::MissingTarget => write!(f, "no usable salary target"),
        }
    }
}

/// Numeric field value staged between the missing-value and parsing stages
#[derive(Debug, Clone, PartialEq)]
enum NumericCell {
    /// Raw text still to be parsed
    Text(String),
    /// Already resolved (a substituted default)
    Value(f64),
}

/// Partial feature vector built up as a record moves through the chain
#[derive(Debug, Clone, Default)]
pub struct FeatureAccumulator {
    numeric_cells: Vec<NumericCell>,
    features: Vec<f64>,
    salary: Option<f64>,
    target: Option<f64>,
}

impl FeatureAccumulator {
    fn with_capacity(width: usize) -> Self {
        Self {
            numeric_cells: Vec::new(),
            features: Vec::with_capacity(width),
            salary: None,
            target: None,
        }
    }

    /// Completed feature vector and target, consumed by the pipeline
    pub fn finish(self) -> (Vec<f64>, Option<f64>) {
        (self.features, self.target)
    }
}

/// Result of applying one stage to one record
#[derive(Debug)]
pub enum StageOutcome {
    InProgress(FeatureAccumulator),
    Rejected(RejectReason),
}

/// The fixed stage set, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Selection,
    MissingValues,
    CategoricalEncoding,
    NumericParsing,
    TargetExtraction,
}

impl Stage {
    /// The chain order is fixed at compile time
    pub const CHAIN: [Stage; 5] = [
        Stage::Selection,
        Stage::MissingValues,
        Stage::CategoricalEncoding,
        Stage::NumericParsing,
        Stage::TargetExtraction,
    ];

    pub fn apply(
        self,
        acc: FeatureAccumulator,
        record: &RawRecord,
        schema: &FeatureSchema,
        mode: PipelineMode,
    ) -> StageOutcome {
        match self {
            Stage::Selection => select_columns(acc, record, schema, mode),
            Stage::MissingValues => fill_missing(acc, record, schema),
            Stage::CategoricalEncoding => encode_categorical(acc, record, schema),
            Stage::NumericParsing => parse_numeric(acc, record, schema, mode),
            Stage::TargetExtraction => extract_target(acc, mode),
        }
    }
}

/// Run one record through the whole chain
pub(crate) fn run_chain(
    record: &RawRecord,
    schema: &FeatureSchema,
    mode: PipelineMode,
) -> StageOutcome {
    let mut acc = FeatureAccumulator::with_capacity(schema.width());
    for stage in Stage::CHAIN {
        match stage.apply(acc, record, schema, mode) {
            StageOutcome::InProgress(next) => acc = next,
            rejected => return rejected,
        }
    }
    StageOutcome::InProgress(acc)
}

/// Stage 1: every schema column must exist in the record. Values may still be
/// empty; only presence is checked here. Target bounds are required for
/// training runs only.
fn select_columns(
    acc: FeatureAccumulator,
    record: &RawRecord,
    schema: &FeatureSchema,
    mode: PipelineMode,
) -> StageOutcome {
    for column in schema.feature_columns() {
        if !record.contains(column) {
            return StageOutcome::Rejected(RejectReason::MissingColumn(column.to_string()));
        }
    }
    if mode == PipelineMode::Training {
        for column in [&schema.target.lower_column, &schema.target.upper_column] {
            if !record.contains(column) {
                return StageOutcome::Rejected(RejectReason::MissingColumn(column.clone()));
            }
        }
    }
    StageOutcome::InProgress(acc)
}

/// Stage 2: empty numeric fields take the schema default, or reject the
/// record when the field has none. Non-empty text is staged for parsing.
fn fill_missing(
    mut acc: FeatureAccumulator,
    record: &RawRecord,
    schema: &FeatureSchema,
) -> StageOutcome {
    for field in &schema.numeric {
        let raw = record.get(&field.column).unwrap_or("").trim();
        if raw.is_empty() {
            match field.default {
                Some(default) => acc.numeric_cells.push(NumericCell::Value(default)),
                None => {
                    return StageOutcome::Rejected(RejectReason::MissingValue(
                        field.column.clone(),
                    ))
                }
            }
        } else {
            acc.numeric_cells.push(NumericCell::Text(raw.to_string()));
        }
    }
    StageOutcome::InProgress(acc)
}

/// Stage 3: categorical values map into their canonical slots. Anything not
/// in the canonical list, including empty values, lands in the unknown slot
/// so the feature width never varies between runs.
fn encode_categorical(
    mut acc: FeatureAccumulator,
    record: &RawRecord,
    schema: &FeatureSchema,
) -> StageOutcome {
    for field in &schema.categorical {
        let raw = record.get(&field.column).unwrap_or("").trim();
        let position = field.categories.iter().position(|c| c == raw);
        match field.encoding {
            Encoding::OneHot => {
                let hot = position.unwrap_or(field.categories.len());
                for slot in 0..=field.categories.len() {
                    acc.features.push(if slot == hot { 1.0 } else { 0.0 });
                }
            }
            Encoding::Ordinal => {
                let code = position.unwrap_or(field.categories.len());
                acc.features.push(code as f64);
            }
        }
    }
    StageOutcome::InProgress(acc)
}

/// Stage 4: staged numeric text becomes f64 feature values; the salary range
/// reduces to its midpoint, or to the single parseable bound. A training
/// record with no parseable bound is rejected here.
fn parse_numeric(
    mut acc: FeatureAccumulator,
    record: &RawRecord,
    schema: &FeatureSchema,
    mode: PipelineMode,
) -> StageOutcome {
    let cells = std::mem::take(&mut acc.numeric_cells);
    for (cell, field) in cells.into_iter().zip(&schema.numeric) {
        match cell {
            NumericCell::Value(v) => acc.features.push(v),
            NumericCell::Text(text) => match text.parse::<f64>() {
                Ok(v) => acc.features.push(v),
                Err(_) => {
                    return StageOutcome::Rejected(RejectReason::UnparseableNumber {
                        column: field.column.clone(),
                        value: text,
                    })
                }
            },
        }
    }

    let lower = parse_bound(record.get(&schema.target.lower_column));
    let upper = parse_bound(record.get(&schema.target.upper_column));
    acc.salary = match (lower, upper) {
        (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
        (Some(lo), None) => Some(lo),
        (None, Some(hi)) => Some(hi),
        (None, None) => {
            if mode == PipelineMode::Training {
                return StageOutcome::Rejected(RejectReason::MissingTarget);
            }
            None
        }
    };
    StageOutcome::InProgress(acc)
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// Stage 5: the reduced salary becomes the record's target. Training records
/// must carry one; inference records survive on features alone.
fn extract_target(mut acc: FeatureAccumulator, mode: PipelineMode) -> StageOutcome {
    match (acc.salary, mode) {
        (Some(salary), _) => {
            acc.target = Some(salary);
            StageOutcome::InProgress(acc)
        }
        (None, PipelineMode::Training) => StageOutcome::Rejected(RejectReason::MissingTarget),
        (None, PipelineMode::Inference) => StageOutcome::InProgress(acc),
    }
}

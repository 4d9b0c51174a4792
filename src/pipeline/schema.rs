//! Feature schema configuration
//!
//! The schema is an explicit value constructed by the caller and threaded into
//! the pipeline. It fixes the canonical feature ordering: all categorical
//! fields (in declaration order, each expanding to its encoded slots) followed
//! by all numeric fields. Every record the pipeline emits conforms to this
//! ordering, so feature width is identical across training and inference.

use serde::{Deserialize, Serialize};

/// Encoding applied to a categorical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Encoding {
    /// One slot per canonical category plus a trailing unknown slot
    OneHot,
    /// Single slot holding the category's position in the canonical list;
    /// unknown values get the code `categories.len()`
    Ordinal,
}

/// A categorical input column with its canonical category list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalField {
    pub column: String,
    pub categories: Vec<String>,
    pub encoding: Encoding,
}

impl CategoricalField {
    pub fn one_hot(column: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            column: column.into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            encoding: Encoding::OneHot,
        }
    }

    pub fn ordinal(column: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            column: column.into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            encoding: Encoding::Ordinal,
        }
    }

    /// Number of feature slots this field occupies
    pub fn width(&self) -> usize {
        match self.encoding {
            Encoding::OneHot => self.categories.len() + 1,
            Encoding::Ordinal => 1,
        }
    }
}

/// A numeric input column. A field without a default is required: records
/// with an empty value are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericField {
    pub column: String,
    pub default: Option<f64>,
}

impl NumericField {
    pub fn required(column: impl Into<String>) -> Self {
        Self { column: column.into(), default: None }
    }

    pub fn with_default(column: impl Into<String>, default: f64) -> Self {
        Self { column: column.into(), default: Some(default) }
    }
}

/// The salary target: a textual range spread over two columns. Both bounds
/// present reduce to the midpoint; a single bound is taken as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub lower_column: String,
    pub upper_column: String,
}

/// Canonical feature schema shared by every record in a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub categorical: Vec<CategoricalField>,
    pub numeric: Vec<NumericField>,
    pub target: TargetSpec,
}

impl FeatureSchema {
    pub fn new(
        categorical: Vec<CategoricalField>,
        numeric: Vec<NumericField>,
        target: TargetSpec,
    ) -> Self {
        Self { categorical, numeric, target }
    }

    /// Schema for the hh.ru job-postings export: experience bracket (ordinal),
    /// employment type and work schedule (one-hot), salary range as target.
    pub fn job_postings() -> Self {
        Self {
            categorical: vec![
                CategoricalField::ordinal(
                    "experience",
                    &["noExperience", "between1And3", "between3And6", "moreThan6"],
                ),
                CategoricalField::one_hot(
                    "employment",
                    &["full", "part", "project", "volunteer", "probation"],
                ),
                CategoricalField::one_hot(
                    "schedule",
                    &["fullDay", "shift", "flexible", "remote", "flyInFlyOut"],
                ),
            ],
            numeric: Vec::new(),
            target: TargetSpec {
                lower_column: "salary_from".to_string(),
                upper_column: "salary_to".to_string(),
            },
        }
    }

    /// Total feature vector width under this schema
    pub fn width(&self) -> usize {
        let categorical: usize = self.categorical.iter().map(|f| f.width()).sum();
        categorical + self.numeric.len()
    }

    /// All input columns the pipeline needs, target bounds excluded
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.categorical
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.numeric.iter().map(|f| f.column.as_str()))
    }
}

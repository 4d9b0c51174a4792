//! Persisted parameter archive
//!
//! One binary file holds everything `predict` needs: weights, intercept, and
//! the standardization stats the model was fit with. The archive is prefixed
//! with a little-endian format version so an incompatible file fails fast at
//! load, before any field is interpreted.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WagecastError};

/// Current archive format version
pub const BUNDLE_VERSION: u32 = 1;

/// Fitted model parameters plus standardization stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub alpha: f64,
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

impl ModelBundle {
    /// Feature count the bundle was fit on
    pub fn feature_width(&self) -> usize {
        self.coefficients.len()
    }

    /// Internal consistency: stat vectors match the weight vector, scales
    /// are usable divisors.
    pub fn validate(&self) -> Result<()> {
        let width = self.coefficients.len();
        if self.mean.len() != width || self.scale.len() != width {
            return Err(WagecastError::SchemaError {
                expected: format!("{} standardization stats", width),
                actual: format!("{} means, {} scales", self.mean.len(), self.scale.len()),
            });
        }
        if self.scale.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(WagecastError::DataError(
                "archive holds non-positive standardization scales".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the archive, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&BUNDLE_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read and validate an archive
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let found = u32::from_le_bytes(version_bytes);
        if found != BUNDLE_VERSION {
            return Err(WagecastError::VersionMismatch {
                expected: BUNDLE_VERSION,
                found,
            });
        }

        let bundle: Self = bincode::deserialize_from(&mut reader)?;
        bundle.validate()?;
        Ok(bundle)
    }
}

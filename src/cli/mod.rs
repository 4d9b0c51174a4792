//! Command-line interface
//!
//! Thin wrappers around the core: resolve paths, run the pipeline or model,
//! report through tracing. Prediction output is the one exception - the JSON
//! array of salaries is printed to stdout and owns that stream; every
//! diagnostic goes to stderr.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::dataset::{npy, Dataset, X_FILE, Y_FILE};
use crate::model::{ModelBundle, RidgeRegression};
use crate::pipeline::{FeatureSchema, Pipeline, RecordSource};

/// Default location of the model archive
pub const DEFAULT_MODEL_PATH: &str = "resources/model.bin";

#[derive(Parser)]
#[command(name = "wagecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Job-posting salary prediction: feature pipeline and ridge regression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a postings CSV into feature/target arrays
    Pipeline {
        /// Input CSV file with a header row
        csv: PathBuf,

        /// Directory for x_data.npy / y_data.npy (default: next to the input)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Fit the ridge model on pipeline output and save the parameter archive
    Train {
        /// Directory holding x_data.npy and y_data.npy
        data_dir: Option<PathBuf>,

        /// Feature matrix path (together with --y)
        #[arg(long)]
        x: Option<PathBuf>,

        /// Target vector path (together with --x)
        #[arg(long)]
        y: Option<PathBuf>,

        /// L2 regularization strength
        #[arg(long, default_value_t = 1.0)]
        alpha: f64,

        /// Where to write the model archive
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,
    },

    /// Predict salaries for a feature matrix, as a JSON array on stdout
    Predict {
        /// Feature matrix (.npy) with the schema the model was trained on
        features: PathBuf,

        /// Model archive to load
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

pub fn cmd_pipeline(csv: &Path, output_dir: Option<&Path>) -> anyhow::Result<()> {
    if !csv.is_file() {
        anyhow::bail!("input is not a file: {}", csv.display());
    }

    info!(input = %csv.display(), "reading postings");
    let source = RecordSource::from_csv_path(csv)?;
    if source.skipped() > 0 {
        warn!(skipped = source.skipped(), "undecodable rows were dropped");
    }

    let pipeline = Pipeline::new(FeatureSchema::job_postings());
    let (dataset, summary) = pipeline.process(source.records())?;

    let out_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => csv.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    dataset.save(&out_dir)?;

    info!(
        rows_in = summary.rows_in,
        accepted = summary.accepted,
        rejected = summary.rejected,
        x = %out_dir.join(X_FILE).display(),
        y = %out_dir.join(Y_FILE).display(),
        "pipeline finished"
    );
    Ok(())
}

pub fn cmd_train(
    data_dir: Option<&Path>,
    x: Option<&Path>,
    y: Option<&Path>,
    alpha: f64,
    output: &Path,
) -> anyhow::Result<()> {
    let (x_path, y_path) = match (data_dir, x, y) {
        (Some(dir), None, None) => (dir.join(X_FILE), dir.join(Y_FILE)),
        (None, Some(x), Some(y)) => (x.to_path_buf(), y.to_path_buf()),
        _ => anyhow::bail!("provide a data directory, or both --x and --y"),
    };

    info!(x = %x_path.display(), y = %y_path.display(), "loading arrays");
    let dataset = Dataset::load_parts(&x_path, &y_path)?;
    info!(
        samples = dataset.nrows(),
        features = dataset.feature_width(),
        alpha,
        "fitting ridge model"
    );

    let mut model = RidgeRegression::new(alpha);
    model.fit(dataset.x(), dataset.y())?;
    let r2 = model.score(dataset.x(), dataset.y())?;
    info!(r2, "model fit");

    model.to_bundle()?.save(output)?;
    info!(path = %output.display(), "model archive written");
    Ok(())
}

pub fn cmd_predict(features: &Path, model_path: &Path) -> anyhow::Result<()> {
    let bundle = ModelBundle::load(model_path)?;
    info!(
        path = %model_path.display(),
        features = bundle.feature_width(),
        "model archive loaded"
    );

    let model = RidgeRegression::from_bundle(bundle)?;
    let x = npy::read_matrix(features)?;
    let predictions = model.predict(&x)?;
    info!(rows = predictions.len(), "predictions computed");

    // The JSON array is the sole stdout content.
    println!("{}", serde_json::to_string(&predictions.to_vec())?);
    Ok(())
}

//! wagecast - job-posting salary prediction
//!
//! Entry point wiring the CLI subcommands to the core.

use clap::Parser;
use wagecast::cli::{cmd_pipeline, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Diagnostics stay on stderr; stdout belongs to prediction output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wagecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pipeline { csv, output_dir } => cmd_pipeline(&csv, output_dir.as_deref()),
        Commands::Train {
            data_dir,
            x,
            y,
            alpha,
            output,
        } => cmd_train(data_dir.as_deref(), x.as_deref(), y.as_deref(), alpha, &output),
        Commands::Predict { features, model } => cmd_predict(&features, &model),
    }
}

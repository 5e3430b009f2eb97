use anyhow::Context;
use clap::{Parser, Subcommand};
use scorecast::pipeline::{run_with_config, PredictPipeline};
use scorecast::PipelineConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scorecast", about = "Exam score prediction pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full training pipeline and print the report
    Train {
        /// Source dataset CSV (defaults to data/stud.csv)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Score a CSV of feature rows with the trained artifacts
    Predict {
        /// CSV with the training feature columns (no target)
        #[arg(long)]
        data: PathBuf,
        /// Write predictions to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let _guard = scorecast::logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train { source } => {
            let mut config = PipelineConfig::from_env();
            if let Some(source) = source {
                config = config.with_source(source);
            }

            let report = run_with_config(config).context("training pipeline failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Predict { data, output } => {
            let config = PipelineConfig::from_env();
            let mut pipeline = PredictPipeline::new(config);
            let predictions = pipeline
                .predict_csv(&data)
                .with_context(|| format!("failed to score {}", data.display()))?;

            let mut lines = String::from("prediction\n");
            for p in predictions.iter() {
                lines.push_str(&format!("{p}\n"));
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, lines)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("wrote {} predictions to {}", predictions.len(), path.display());
                }
                None => print!("{lines}"),
            }
        }
    }

    Ok(())
}

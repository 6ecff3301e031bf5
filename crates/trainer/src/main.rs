//! `noshow-train`: offline training and bundle inspection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;

use noshow_ai::{FixedBundle, PredictionService, ServingBundle, TrainParams};
use noshow_infra::{ArtifactStore, EmptyPartitionPolicy, TrainingConfig, TrainingMode, TrainingOrchestrator};

mod probes;

#[derive(Parser, Debug)]
#[command(name = "noshow-train")]
#[command(about = "Train and inspect no-show risk model bundles")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a bundle from a JSON-lines corpus and write it atomically.
    Train(TrainArgs),
    /// Load a bundle and score the reference probes against it.
    Inspect {
        #[arg(long, env = "NOSHOW_BUNDLE_PATH", default_value = "models/no_show_model.json")]
        bundle: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct TrainArgs {
    /// Labeled corpus, one JSON object per line.
    #[arg(long, env = "NOSHOW_CORPUS_PATH")]
    corpus: PathBuf,

    #[arg(long, env = "NOSHOW_BUNDLE_PATH", default_value = "models/no_show_model.json")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Mode::Dual)]
    mode: Mode,

    #[arg(long, default_value_t = 42, env = "NOSHOW_TRAIN_SEED")]
    seed: u64,

    #[arg(long, default_value_t = 0.2)]
    validation_fraction: f64,

    /// Rounds without validation improvement before stopping.
    #[arg(long, default_value_t = 5)]
    patience: usize,

    #[arg(long, default_value_t = 300)]
    max_rounds: usize,

    #[arg(long, default_value_t = 0.5)]
    learning_rate: f64,

    #[arg(long, default_value_t = 1e-4)]
    l2: f64,

    #[arg(long, value_enum, default_value_t = EmptyPolicy::Abort)]
    empty_partition: EmptyPolicy,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Dual,
    Legacy,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EmptyPolicy {
    Abort,
    Skip,
}

fn main() -> Result<()> {
    noshow_observability::tracing::init_cli();

    match Args::parse().command {
        Command::Train(args) => train(args),
        Command::Inspect { bundle } => inspect(bundle),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let config = TrainingConfig {
        params: TrainParams {
            learning_rate: args.learning_rate,
            max_rounds: args.max_rounds,
            patience: args.patience,
            l2: args.l2,
            validation_fraction: args.validation_fraction,
            seed: args.seed,
        },
        empty_partition: match args.empty_partition {
            EmptyPolicy::Abort => EmptyPartitionPolicy::Abort,
            EmptyPolicy::Skip => EmptyPartitionPolicy::Skip,
        },
        ..TrainingConfig::default()
    };
    let mode = match args.mode {
        Mode::Dual => TrainingMode::Dual,
        Mode::Legacy => TrainingMode::Legacy,
    };

    let (persisted, report) = TrainingOrchestrator::new(config)
        .run(&args.corpus, &args.output, mode)
        .with_context(|| format!("training from {} failed", args.corpus.display()))?;
    info!(output = %args.output.display(), version = %persisted.version, "training complete");

    let out = json!({
        "output": args.output.display().to_string(),
        "version": persisted.version.to_string(),
        "variant": persisted.bundle.variant_name(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn inspect(path: PathBuf) -> Result<()> {
    let persisted = ArtifactStore::load(&path).with_context(|| format!("failed to load {}", path.display()))?;
    let variant = persisted.bundle.variant_name();
    let horizons: Vec<&str> = persisted.bundle.horizons().iter().map(|h| h.as_str()).collect();
    let version = persisted.version.to_string();
    let created_at = persisted.created_at.to_rfc3339();

    let service = PredictionService::new(FixedBundle::from(ServingBundle::new(persisted)));
    let out = json!({
        "bundle": path.display().to_string(),
        "variant": variant,
        "version": version,
        "created_at": created_at,
        "horizons": horizons,
        "probes": probes::run_probes(&service),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

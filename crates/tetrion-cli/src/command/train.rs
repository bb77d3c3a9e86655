use std::path::PathBuf;

use anyhow::Context as _;

use tetrion_agent::LineClearReward;
use tetrion_learner::{Checkpointer, Trainer, TrainerConfig};

use crate::util::Output;

use super::EncoderKind;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of training episodes
    #[arg(long, default_value_t = 3000)]
    episodes: usize,
    /// Episodes between progress checkpoints
    #[arg(long, default_value_t = 200)]
    save_interval: usize,
    /// Afterstate feature encoding
    #[arg(long, default_value = "compact")]
    encoder: EncoderKind,
    /// Append the piece identity to the feature vector
    #[arg(long)]
    include_piece: bool,
    /// Checkpoint directory
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,
    /// Resume from the latest checkpoint instead of starting fresh
    #[arg(long)]
    resume: bool,
    /// Seed for action selection and batch sampling
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the run report (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let encoder = super::build_encoder(arg.encoder, arg.include_piece);
    eprintln!(
        "Training with the {} encoder ({} features), {} episodes",
        encoder.name(),
        encoder.feature_len(),
        arg.episodes,
    );

    let config = TrainerConfig {
        episodes: arg.episodes,
        ..TrainerConfig::default()
    };
    let checkpointer = Checkpointer::new(arg.checkpoint_dir.clone(), arg.save_interval);

    let mut trainer = Trainer::new(
        config,
        encoder,
        Box::new(LineClearReward),
        checkpointer,
        arg.seed,
    )?;

    if arg.resume {
        let meta = trainer
            .resume_latest()
            .context("failed to resume from the latest checkpoint")?;
        eprintln!(
            "Resumed {} ({} episodes, trained at {})",
            meta.name, meta.episodes, meta.trained_at
        );
    }

    let report = trainer.train()?;

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Episodes: {}", report.episodes);
    eprintln!("  Steps:    {}", report.steps);
    eprintln!(
        "  Recent mean pieces {:.1}, lines {:.1}",
        report.mean_pieces_recent, report.mean_lines_recent
    );
    eprintln!("  Checkpoints: {}", arg.checkpoint_dir.display());

    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context as _;

use tetrion_agent::{CandidateSet, SessionSummary};
use tetrion_engine::{GameField, LineGroup};
use tetrion_learner::{Checkpointer, ValueNetwork, greedy_index};

use crate::util::{Output, SessionReport};

use super::EncoderKind;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Checkpoint directory holding the `latest` slot
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,
    /// Feature encoding the checkpoint was trained with
    #[arg(long, default_value = "compact")]
    encoder: EncoderKind,
    /// Whether the checkpoint was trained with the piece identity appended
    #[arg(long)]
    include_piece: bool,
    /// Number of evaluation episodes
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    /// Turn limit per episode
    #[arg(long, default_value_t = 1000)]
    turn_limit: usize,
    /// Output file path for the report (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let encoder = super::build_encoder(arg.encoder, arg.include_piece);
    let mut network = ValueNetwork::new(encoder.feature_len())?;

    let checkpointer = Checkpointer::new(arg.checkpoint_dir.clone(), 1);
    let meta = checkpointer
        .load_latest(&mut network)
        .with_context(|| {
            format!(
                "failed to load the latest checkpoint from {}",
                arg.checkpoint_dir.display()
            )
        })?;
    eprintln!(
        "Loaded {} ({} episodes, encoder {}, trained at {})",
        meta.name, meta.episodes, meta.encoder, meta.trained_at
    );

    let mut summaries = Vec::with_capacity(arg.episodes);
    for episode in 0..arg.episodes {
        let mut field = GameField::new();
        let mut summary = SessionSummary::default();

        for _ in 0..arg.turn_limit {
            let candidates =
                CandidateSet::enumerate(field.board(), field.current_piece(), encoder.as_ref());
            let index = greedy_index(&network, &candidates)?;
            let Ok(groups) = field.commit(candidates.candidates()[index].placement) else {
                break;
            };
            summary.completed_pieces += 1;
            summary.cleared_lines += groups.iter().map(LineGroup::size).sum::<usize>();
        }

        eprintln!(
            "Episode {}: pieces {} @ lines {}",
            episode + 1,
            summary.completed_pieces,
            summary.cleared_lines
        );
        summaries.push(summary);
    }

    let report = SessionReport::from_summaries(&summaries);
    eprintln!();
    eprintln!(
        "Evaluation over {} episodes: mean pieces {:.1}, mean lines {:.1}",
        report.episodes, report.mean_pieces, report.mean_lines
    );

    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

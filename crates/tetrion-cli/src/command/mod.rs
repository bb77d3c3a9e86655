use clap::{Parser, Subcommand};

use tetrion_agent::{CompactEncoder, FeatureEncoder, PerColumnEncoder};

use self::{evaluate::EvaluateArg, play_heuristic::PlayHeuristicArg, train::TrainArg};

mod evaluate;
mod play_heuristic;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the afterstate value learner
    Train(#[clap(flatten)] TrainArg),
    /// Play greedy episodes with a trained value network
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Run the fixed-weight heuristic baseline agent
    PlayHeuristic(#[clap(flatten)] PlayHeuristicArg),
}

/// Feature encoding selected on the command line.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum EncoderKind {
    /// 3-scalar field summary plus line count.
    #[default]
    Compact,
    /// Per-column heights, elevations, and holes plus line count.
    Columns,
}

pub(crate) fn build_encoder(kind: EncoderKind, include_piece: bool) -> Box<dyn FeatureEncoder> {
    match kind {
        EncoderKind::Compact => Box::new(CompactEncoder::new(include_piece)),
        EncoderKind::Columns => Box::new(PerColumnEncoder::new(include_piece)),
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::PlayHeuristic(arg) => play_heuristic::run(&arg)?,
    }
    Ok(())
}

use std::path::PathBuf;

use tetrion_agent::HeuristicAgent;
use tetrion_engine::GameField;

use crate::util::{Output, SessionReport};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayHeuristicArg {
    /// Number of sessions to play
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    /// Turn limit per session
    #[arg(long, default_value_t = 3000)]
    turn_limit: usize,
    /// Output file path for the report (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayHeuristicArg) -> anyhow::Result<()> {
    let agent = HeuristicAgent::default();

    let mut summaries = Vec::with_capacity(arg.episodes);
    for episode in 0..arg.episodes {
        let mut field = GameField::new();
        let summary = agent.play_session(&mut field, arg.turn_limit);
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
        "Heuristic baseline over {} episodes: mean pieces {:.1}, mean lines {:.1}",
        report.episodes, report.mean_pieces, report.mean_lines
    );

    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use tetrion_agent::SessionSummary;
use tetrion_learner::DescriptiveStats;

/// JSON artifact sink: a file when a path is given, stdout otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Aggregated result of a batch of played sessions.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub episodes: usize,
    pub mean_pieces: f32,
    pub max_pieces: f32,
    pub mean_lines: f32,
    pub max_lines: f32,
}

impl SessionReport {
    #[expect(clippy::cast_precision_loss)]
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        let pieces =
            DescriptiveStats::compute(summaries.iter().map(|s| s.completed_pieces as f32));
        let lines = DescriptiveStats::compute(summaries.iter().map(|s| s.cleared_lines as f32));

        Self {
            generated_at: Utc::now(),
            episodes: summaries.len(),
            mean_pieces: pieces.map_or(0.0, |s| s.mean),
            max_pieces: pieces.map_or(0.0, |s| s.max),
            mean_lines: lines.map_or(0.0, |s| s.mean),
            max_lines: lines.map_or(0.0, |s| s.max),
        }
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::PzipError;
use crate::format::RunFormat;
use crate::pipeline::CoordinatorState;
use crate::sink::SinkStats;

/// What happened to one input path.
#[derive(Debug)]
pub enum FileOutcome {
    /// Every run of the file reached the sink.
    Encoded {
        input_bytes: u64,
        runs: u64,
        elapsed: Duration,
    },
    /// The file could not be opened or mapped; no worker was launched.
    OpenFailed(PzipError),
    /// The worker started but stopped early. Runs emitted before the
    /// failure remain in the output.
    WorkerFailed {
        input_bytes: u64,
        runs: u64,
        error: PzipError,
    },
}

/// Outcome of one input path, in command-line order.
#[derive(Debug)]
pub struct FileReport {
    pub index: usize,
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Input path as given on the command line.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True only when the whole file reached the sink.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Encoded { .. })
    }

    pub fn error(&self) -> Option<&PzipError> {
        match &self.outcome {
            FileOutcome::Encoded { .. } => None,
            FileOutcome::OpenFailed(error) => Some(error),
            FileOutcome::WorkerFailed { error, .. } => Some(error),
        }
    }

    /// Runs this file contributed to the output, complete or not.
    pub fn runs(&self) -> u64 {
        match &self.outcome {
            FileOutcome::Encoded { runs, .. } | FileOutcome::WorkerFailed { runs, .. } => *runs,
            FileOutcome::OpenFailed(_) => 0,
        }
    }

    /// Mapped size of the file; zero when it was never opened.
    pub fn input_bytes(&self) -> u64 {
        match &self.outcome {
            FileOutcome::Encoded { input_bytes, .. }
            | FileOutcome::WorkerFailed { input_bytes, .. } => *input_bytes,
            FileOutcome::OpenFailed(_) => 0,
        }
    }
}

/// Overall classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every file was mapped and fully encoded.
    Success,
    /// Something failed, but some output was produced.
    Partial,
    /// Nothing was produced.
    Failed,
}

/// Result of one coordinator run.
#[derive(Debug)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub sink: SinkStats,
    pub format: RunFormat,
    pub state: CoordinatorState,
    pub elapsed: Duration,
    /// Set when the final flush of the output failed.
    pub finish_error: Option<PzipError>,
}

impl RunReport {
    /// Success only in `Done`. Otherwise `Partial` when some output was
    /// produced and flushed, `Failed` when nothing usable was.
    pub fn status(&self) -> RunStatus {
        if self.state == CoordinatorState::Done {
            return RunStatus::Success;
        }

        let produced = self.sink.runs_emitted > 0 || self.files.iter().any(FileReport::is_success);
        if produced && self.finish_error.is_none() {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == RunStatus::Success
    }

    /// Files that were skipped or stopped early, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| !file.is_success())
    }

    pub fn succeeded_count(&self) -> usize {
        self.files.iter().filter(|file| file.is_success()).count()
    }

    pub fn input_bytes_total(&self) -> u64 {
        self.files.iter().map(FileReport::input_bytes).sum()
    }

    pub fn summary(&self) -> RunSummary {
        let input_bytes = self.input_bytes_total();
        let output_input_ratio = if input_bytes == 0 {
            1.0
        } else {
            self.sink.bytes_written as f64 / input_bytes as f64
        };

        RunSummary {
            status: self.status(),
            format: self.format,
            files_total: self.files.len(),
            files_succeeded: self.succeeded_count(),
            files_failed: self.files.len() - self.succeeded_count(),
            input_bytes,
            output_bytes: self.sink.bytes_written,
            runs_emitted: self.sink.runs_emitted,
            output_input_ratio,
            elapsed: self.elapsed,
        }
    }
}

/// Flat, serializable digest of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub format: RunFormat,
    pub files_total: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub runs_emitted: u64,
    pub output_input_ratio: f64,
    pub elapsed: Duration,
}

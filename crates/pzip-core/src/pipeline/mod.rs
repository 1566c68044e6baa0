use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::unbounded;

use crate::PzipError;
use crate::core::worker::panic_message;
use crate::core::{WorkAssignment, WorkerOutcome, run_worker};
use crate::io::MmapInput;
use crate::report::{FileOutcome, FileReport, RunReport};
use crate::sink::{OutputSink, SinkStats};
use crate::telemetry::{self, DefaultWorkerTelemetry, WorkerTelemetry, profile, tags};
use crate::types::Result;

mod types;

pub use types::{CoordinatorState, PipelineOptions};

const PROFILE_TAG_STACK_PIPELINE: [&str; 2] = [tags::TAG_SYSTEM, tags::TAG_PIPELINE];

/// Runs one worker thread per input file, all appending to one shared sink.
///
/// Files that cannot be opened are recorded and skipped; the remaining
/// files are still encoded. Views and the sink are released only after
/// every launched worker has joined.
pub struct CompressionPipeline {
    options: PipelineOptions,
    telemetry: Arc<dyn WorkerTelemetry>,
}

impl CompressionPipeline {
    /// Creates a pipeline that reports through [`DefaultWorkerTelemetry`].
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_telemetry(options, Arc::new(DefaultWorkerTelemetry))
    }

    /// Creates a pipeline that reports worker lifecycle to `telemetry`.
    pub fn with_telemetry(options: PipelineOptions, telemetry: Arc<dyn WorkerTelemetry>) -> Self {
        Self { options, telemetry }
    }

    /// Options every run of this pipeline uses.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Compresses `paths` into `writer`.
    ///
    /// Returns the report and the flushed writer. The writer is `None` when
    /// finishing the sink failed; the cause is in
    /// [`RunReport::finish_error`].
    ///
    /// # Errors
    /// Only [`PzipError::Usage`] when `paths` is empty. Per-file and
    /// per-worker failures are reported in the [`RunReport`].
    pub fn run<P, W>(&self, paths: &[P], writer: W) -> Result<(RunReport, Option<W>)>
    where
        P: AsRef<Path>,
        W: Write + Send + 'static,
    {
        validate_inputs(paths)?;
        Ok(self.execute(paths, writer))
    }

    /// Compresses `paths` into a freshly created (or truncated) file.
    ///
    /// The input list is validated before the output is touched, so a usage
    /// error never leaves an output file behind.
    ///
    /// # Errors
    /// [`PzipError::Usage`] for an empty input list, or an I/O error if the
    /// output file cannot be created.
    pub fn run_to_path<P>(&self, paths: &[P], output: &Path) -> Result<RunReport>
    where
        P: AsRef<Path>,
    {
        validate_inputs(paths)?;
        let file = File::create(output).map_err(|error| {
            PzipError::Io(error).with_context(format!("failed to create {}", output.display()))
        })?;

        let (report, _writer) = self.execute(paths, BufWriter::new(file));
        Ok(report)
    }

    fn execute<P, W>(&self, paths: &[P], writer: W) -> (RunReport, Option<W>)
    where
        P: AsRef<Path>,
        W: Write + Send + 'static,
    {
        let started_at = Instant::now();
        let mut state = CoordinatorState::Init;
        telemetry::increment_counter(
            tags::METRIC_PIPELINE_RUN_COUNT,
            1,
            &[("subsystem", "pipeline"), ("op", "run")],
        );
        tracing::info!(
            files = paths.len(),
            format = %self.options.format,
            "starting compression"
        );

        let sink = Arc::new(OutputSink::new(writer, self.options.format));
        let mut outcomes: Vec<Option<FileOutcome>> = (0..paths.len()).map(|_| None).collect();

        advance(&mut state, CoordinatorState::Launching);
        let (outcome_tx, outcome_rx) = unbounded::<WorkerOutcome>();
        let mut launched: Vec<(usize, u64, JoinHandle<()>)> = Vec::with_capacity(paths.len());

        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let input = match MmapInput::open(path) {
                Ok(input) => input,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping input");
                    telemetry::increment_counter(
                        tags::METRIC_PIPELINE_FILES_SKIPPED,
                        1,
                        &[("subsystem", "pipeline"), ("op", "launch")],
                    );
                    outcomes[index] = Some(FileOutcome::OpenFailed(error));
                    continue;
                }
            };

            let input_bytes = input.len_u64();
            let assignment = WorkAssignment {
                file_index: index,
                input,
                sink: Arc::clone(&sink),
                telemetry: Arc::clone(&self.telemetry),
            };
            let worker_tx = outcome_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", self.options.thread_name_prefix))
                .spawn(move || {
                    let outcome = run_worker(assignment);
                    // The receiver outlives every worker; a failed send cannot happen.
                    let _ = worker_tx.send(outcome);
                });

            match spawned {
                Ok(handle) => launched.push((index, input_bytes, handle)),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "failed to spawn worker");
                    outcomes[index] = Some(FileOutcome::WorkerFailed {
                        input_bytes,
                        runs: 0,
                        error: PzipError::Io(error).with_context("failed to spawn worker"),
                    });
                }
            }
        }
        drop(outcome_tx);

        advance(&mut state, CoordinatorState::Running);
        tracing::debug!(workers = launched.len(), "workers running");

        advance(&mut state, CoordinatorState::Joining);
        let mut views = Vec::with_capacity(launched.len());
        for outcome in outcome_rx.iter() {
            let WorkerOutcome {
                file_index,
                input,
                runs_emitted,
                elapsed,
                result,
            } = outcome;
            let input_bytes = input.len_u64();
            outcomes[file_index] = Some(match result {
                Ok(()) => FileOutcome::Encoded {
                    input_bytes,
                    runs: runs_emitted,
                    elapsed,
                },
                Err(error) => FileOutcome::WorkerFailed {
                    input_bytes,
                    runs: runs_emitted,
                    error,
                },
            });
            views.push(input);
        }

        for (index, input_bytes, handle) in launched {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                tracing::error!(file_index = index, %message, "worker thread panicked");
                if outcomes[index].is_none() {
                    outcomes[index] = Some(FileOutcome::WorkerFailed {
                        input_bytes,
                        runs: 0,
                        error: PzipError::WorkerPanicked(message),
                    });
                }
            }
        }

        // Every worker has joined; release the views before closing the sink.
        drop(views);

        let (sink_stats, writer, finish_error) = close_sink(sink);

        let files: Vec<FileReport> = paths
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (path, outcome))| FileReport {
                index,
                path: path.as_ref().to_path_buf(),
                outcome: outcome.unwrap_or_else(|| FileOutcome::WorkerFailed {
                    input_bytes: 0,
                    runs: 0,
                    error: PzipError::WorkerPanicked("worker exited without reporting".into()),
                }),
            })
            .collect();

        let all_succeeded = files.iter().all(FileReport::is_success) && finish_error.is_none();
        advance(
            &mut state,
            if all_succeeded {
                CoordinatorState::Done
            } else {
                CoordinatorState::Failed
            },
        );

        let report = RunReport {
            files,
            sink: sink_stats,
            format: self.options.format,
            state,
            elapsed: started_at.elapsed(),
            finish_error,
        };

        profile::event(
            tags::PROFILE_PIPELINE,
            &PROFILE_TAG_STACK_PIPELINE,
            "run",
            if all_succeeded { "ok" } else { "error" },
            profile::elapsed_us(started_at),
            "compression run finished",
        );
        tracing::info!(
            status = ?report.status(),
            succeeded = report.succeeded_count(),
            failed = report.files.len() - report.succeeded_count(),
            runs = report.sink.runs_emitted,
            output_bytes = report.sink.bytes_written,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "compression finished"
        );

        (report, writer)
    }
}

impl Default for CompressionPipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

/// Rejects an empty input list before any resource is acquired.
pub fn validate_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    if paths.is_empty() {
        return Err(PzipError::Usage("at least one input file is required"));
    }
    Ok(())
}

fn advance(state: &mut CoordinatorState, next: CoordinatorState) {
    debug_assert!(
        state.can_advance_to(next),
        "illegal coordinator transition {state:?} -> {next:?}"
    );
    tracing::trace!(from = state.as_str(), to = next.as_str(), "coordinator state");
    *state = next;
}

fn close_sink<W: Write>(
    sink: Arc<OutputSink<W>>,
) -> (SinkStats, Option<W>, Option<PzipError>) {
    let sink = match Arc::try_unwrap(sink) {
        Ok(sink) => sink,
        Err(shared) => {
            let stats = shared.stats();
            let error = PzipError::Other(anyhow::anyhow!(
                "output sink still shared after all workers joined"
            ));
            return (stats, None, Some(error));
        }
    };

    let stats = sink.stats();
    match sink.finish() {
        Ok(writer) => (stats, Some(writer), None),
        Err(error) => {
            tracing::error!(%error, "failed to finish output");
            (stats, None, Some(error))
        }
    }
}

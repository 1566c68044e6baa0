use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::PzipError;
use crate::format::RunFormat;
use crate::telemetry::{self, profile, tags};
use crate::types::{Result, Run};

const PROFILE_TAG_STACK_SINK: [&str; 2] = [tags::TAG_SYSTEM, tags::TAG_SINK];

/// Counters describing what a sink has accepted so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStats {
    /// Runs appended successfully.
    pub runs_emitted: u64,
    /// Encoded bytes handed to the writer.
    pub bytes_written: u64,
    /// `emit` calls that failed.
    pub failed_emits: u64,
}

/// The single append-only destination shared by every worker.
///
/// The writer lives behind a mutex that is held for exactly one
/// [`emit`](OutputSink::emit): a run is encoded outside the lock and then
/// written with a single `write_all`, so records from different workers are
/// never interleaved. No ordering is promised between workers.
///
/// Workers receive the sink through an `Arc`; only the owner can call
/// [`finish`](OutputSink::finish) once every handle is gone.
#[derive(Debug)]
pub struct OutputSink<W: Write> {
    writer: Mutex<W>,
    format: RunFormat,
    runs_emitted: AtomicU64,
    bytes_written: AtomicU64,
    failed_emits: AtomicU64,
}

impl<W: Write> OutputSink<W> {
    /// Wraps `writer`; every run is encoded with `format`.
    pub fn new(writer: W, format: RunFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
            runs_emitted: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            failed_emits: AtomicU64::new(0),
        }
    }

    /// Wire format used for every record.
    pub fn format(&self) -> RunFormat {
        self.format
    }

    /// Appends one run atomically with respect to every other `emit`.
    ///
    /// A writer that panicked mid-`emit` does not block later emits; the
    /// panicking worker alone reports the failure.
    ///
    /// # Errors
    /// [`PzipError::Io`] if the underlying write fails.
    pub fn emit(&self, run: &Run) -> Result<()> {
        let mut scratch = Vec::with_capacity(self.format.max_encoded_len(run));
        self.emit_with(run, &mut scratch)
    }

    /// Same as [`emit`](OutputSink::emit) but encodes into caller-owned
    /// scratch space so a worker can reuse one allocation for every run.
    pub fn emit_with(&self, run: &Run, scratch: &mut Vec<u8>) -> Result<()> {
        scratch.clear();
        let record_len = self.format.encode_into(run, scratch);

        let wait_started = Instant::now();
        let result = {
            let mut writer = self.lock();
            telemetry::record_histogram(
                tags::METRIC_SINK_LOCK_WAIT_US,
                profile::elapsed_us(wait_started),
                &[("subsystem", "sink"), ("op", "lock")],
            );
            writer.write_all(&scratch[..]).map_err(PzipError::from)
        };

        match &result {
            Ok(()) => {
                self.runs_emitted.fetch_add(1, Ordering::Relaxed);
                self.bytes_written
                    .fetch_add(record_len as u64, Ordering::Relaxed);
                telemetry::increment_counter(
                    tags::METRIC_SINK_EMIT_COUNT,
                    1,
                    &[("subsystem", "sink"), ("op", "emit")],
                );
                telemetry::record_histogram(
                    tags::METRIC_SINK_RECORD_BYTES,
                    record_len as u64,
                    &[("subsystem", "sink"), ("op", "emit")],
                );
            }
            Err(_) => {
                self.failed_emits.fetch_add(1, Ordering::Relaxed);
                telemetry::increment_counter(
                    tags::METRIC_SINK_EMIT_FAIL_COUNT,
                    1,
                    &[("subsystem", "sink"), ("op", "emit"), ("result", "error")],
                );
                profile::event(
                    tags::PROFILE_SINK,
                    &PROFILE_TAG_STACK_SINK,
                    "emit",
                    "error",
                    profile::elapsed_us(wait_started),
                    "sink emit failed",
                );
            }
        }

        result
    }

    /// Snapshot of the counters; safe to call while workers are emitting.
    pub fn stats(&self) -> SinkStats {
        SinkStats {
            runs_emitted: self.runs_emitted.load(Ordering::Acquire),
            bytes_written: self.bytes_written.load(Ordering::Acquire),
            failed_emits: self.failed_emits.load(Ordering::Acquire),
        }
    }

    /// Flushes and returns the writer. Consumes the sink, so it happens once.
    ///
    /// Records accepted before a writer panic are kept and flushed.
    ///
    /// # Errors
    /// [`PzipError::Io`] if the flush fails.
    pub fn finish(self) -> Result<W> {
        let started_at = Instant::now();
        let mut writer = self
            .writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let flushed = writer
            .flush()
            .map_err(|error| PzipError::Io(error).with_context("failed to flush output"));

        profile::event(
            tags::PROFILE_SINK,
            &PROFILE_TAG_STACK_SINK,
            "finish",
            if flushed.is_ok() { "ok" } else { "error" },
            profile::elapsed_us(started_at),
            "sink finished",
        );

        flushed.map(|()| writer)
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // A panic can leave at most the record in flight incomplete.
                tracing::warn!("recovering output sink after a writer panic");
                self.writer.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

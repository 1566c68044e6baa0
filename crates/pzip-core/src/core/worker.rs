use std::any::Any;
use std::io::Write;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::MmapInput;
use crate::PzipError;
use crate::rle::RunEncoder;
use crate::sink::OutputSink;
use crate::telemetry::WorkerTelemetry;
use crate::types::Result;

/// Everything one worker needs to encode one file.
pub struct WorkAssignment<W: Write> {
    /// Position of the file in the coordinator's input list.
    pub file_index: usize,
    pub input: MmapInput,
    pub sink: Arc<OutputSink<W>>,
    pub telemetry: Arc<dyn WorkerTelemetry>,
}

/// What a finished worker hands back to the coordinator.
///
/// The input view travels back with the outcome so the coordinator can
/// release every view together once all workers have joined.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub file_index: usize,
    pub input: MmapInput,
    pub runs_emitted: u64,
    pub elapsed: Duration,
    pub result: Result<()>,
}

/// Encodes the assignment's whole input and emits every run, in scan order.
///
/// Runs are streamed one at a time. The first failed `emit` stops this
/// worker; a panic is caught and reported as [`PzipError::WorkerPanicked`].
pub fn run_worker<W: Write>(assignment: WorkAssignment<W>) -> WorkerOutcome {
    let WorkAssignment {
        file_index,
        input,
        sink,
        telemetry,
    } = assignment;

    telemetry.on_worker_started(file_index, input.len_u64());
    let started_at = Instant::now();
    let mut runs_emitted = 0u64;

    let result = match catch_unwind(AssertUnwindSafe(|| {
        encode_into_sink(&input, &sink, &mut runs_emitted)
    })) {
        Ok(result) => result,
        Err(payload) => Err(PzipError::WorkerPanicked(panic_message(payload.as_ref()))),
    };

    let elapsed = started_at.elapsed();
    match &result {
        Ok(()) => telemetry.on_worker_finished(file_index, runs_emitted, elapsed),
        Err(error) => {
            telemetry.on_worker_failed(file_index, runs_emitted, elapsed);
            tracing::warn!(
                file_index,
                path = %input.path().display(),
                runs_emitted,
                %error,
                "worker stopped early"
            );
        }
    }

    WorkerOutcome {
        file_index,
        input,
        runs_emitted,
        elapsed,
        result,
    }
}

fn encode_into_sink<W: Write>(
    input: &MmapInput,
    sink: &OutputSink<W>,
    runs_emitted: &mut u64,
) -> Result<()> {
    let mut scratch = Vec::new();
    for run in RunEncoder::new(input.as_slice()) {
        sink.emit_with(&run, &mut scratch)?;
        *runs_emitted += 1;
    }
    Ok(())
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

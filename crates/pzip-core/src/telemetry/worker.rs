use std::time::Duration;

use crate::telemetry::{self, profile, tags};
use crate::types::duration_to_us;

const PROFILE_TAG_STACK_WORKER: [&str; 2] = [tags::TAG_SYSTEM, tags::TAG_WORKER];

/// Hooks invoked by each worker over its lifetime.
///
/// The coordinator shares one implementation across all workers, so
/// implementations must tolerate concurrent calls.
pub trait WorkerTelemetry: Send + Sync {
    fn on_worker_started(&self, file_index: usize, input_len: u64);
    fn on_worker_finished(&self, file_index: usize, runs: u64, elapsed: Duration);
    fn on_worker_failed(&self, file_index: usize, runs: u64, elapsed: Duration);
}

/// Records worker metrics in the global registry and logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWorkerTelemetry;

impl WorkerTelemetry for DefaultWorkerTelemetry {
    fn on_worker_started(&self, file_index: usize, input_len: u64) {
        telemetry::increment_counter(
            tags::METRIC_WORKER_START_COUNT,
            1,
            &[("subsystem", "worker"), ("op", "start")],
        );
        profile::event(
            tags::PROFILE_WORKER,
            &PROFILE_TAG_STACK_WORKER,
            "start",
            "ok",
            0,
            "worker started",
        );
        tracing::debug!(file_index, input_len, "worker started");
    }

    fn on_worker_finished(&self, file_index: usize, runs: u64, elapsed: Duration) {
        let elapsed_us = duration_to_us(elapsed);
        telemetry::increment_counter(
            tags::METRIC_WORKER_FINISH_COUNT,
            1,
            &[("subsystem", "worker"), ("op", "finish"), ("result", "ok")],
        );
        telemetry::record_histogram(
            tags::METRIC_WORKER_LATENCY_US,
            elapsed_us,
            &[("subsystem", "worker"), ("result", "ok")],
        );
        telemetry::record_histogram(tags::METRIC_WORKER_RUNS, runs, &[("subsystem", "worker")]);
        profile::event(
            tags::PROFILE_WORKER,
            &PROFILE_TAG_STACK_WORKER,
            "finish",
            "ok",
            elapsed_us,
            "worker finished",
        );
        tracing::debug!(file_index, runs, elapsed_us, "worker finished");
    }

    fn on_worker_failed(&self, file_index: usize, runs: u64, elapsed: Duration) {
        let elapsed_us = duration_to_us(elapsed);
        telemetry::increment_counter(
            tags::METRIC_WORKER_FAIL_COUNT,
            1,
            &[("subsystem", "worker"), ("op", "finish"), ("result", "error")],
        );
        telemetry::record_histogram(
            tags::METRIC_WORKER_LATENCY_US,
            elapsed_us,
            &[("subsystem", "worker"), ("result", "error")],
        );
        profile::event(
            tags::PROFILE_WORKER,
            &PROFILE_TAG_STACK_WORKER,
            "finish",
            "error",
            elapsed_us,
            "worker failed",
        );
        tracing::debug!(file_index, runs, elapsed_us, "worker failed");
    }
}

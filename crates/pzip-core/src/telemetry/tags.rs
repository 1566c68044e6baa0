/// Profiling target for memory-mapped input operations.
pub const PROFILE_MMAP: &str = "pzip.profile.mmap";
/// Profiling target for output sink operations.
pub const PROFILE_SINK: &str = "pzip.profile.sink";
/// Profiling target for worker runtime.
pub const PROFILE_WORKER: &str = "pzip.profile.worker";
/// Profiling target for coordinator lifecycle transitions.
pub const PROFILE_PIPELINE: &str = "pzip.profile.pipeline";

pub const TAG_SYSTEM: &str = "system";
pub const TAG_MMAP: &str = "mmap";
pub const TAG_SINK: &str = "sink";
pub const TAG_WORKER: &str = "worker";
pub const TAG_PIPELINE: &str = "pipeline";

pub const METRIC_MMAP_OPEN_COUNT: &str = "pzip.mmap.open.count";
pub const METRIC_MMAP_OPEN_FAIL_COUNT: &str = "pzip.mmap.open.fail.count";
pub const METRIC_MMAP_OPEN_LATENCY_US: &str = "pzip.mmap.open.latency_us";
pub const METRIC_MMAP_MAPPED_BYTES: &str = "pzip.mmap.mapped_bytes";

pub const METRIC_SINK_EMIT_COUNT: &str = "pzip.sink.emit.count";
pub const METRIC_SINK_EMIT_FAIL_COUNT: &str = "pzip.sink.emit.fail.count";
pub const METRIC_SINK_RECORD_BYTES: &str = "pzip.sink.record_bytes";
pub const METRIC_SINK_LOCK_WAIT_US: &str = "pzip.sink.lock_wait_us";

pub const METRIC_WORKER_START_COUNT: &str = "pzip.worker.start.count";
pub const METRIC_WORKER_FINISH_COUNT: &str = "pzip.worker.finish.count";
pub const METRIC_WORKER_FAIL_COUNT: &str = "pzip.worker.fail.count";
pub const METRIC_WORKER_LATENCY_US: &str = "pzip.worker.latency_us";
pub const METRIC_WORKER_RUNS: &str = "pzip.worker.runs";

pub const METRIC_PIPELINE_RUN_COUNT: &str = "pzip.pipeline.run.count";
pub const METRIC_PIPELINE_FILES_SKIPPED: &str = "pzip.pipeline.files_skipped";

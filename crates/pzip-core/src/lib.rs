pub mod core;
pub mod error;
pub mod format;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod rle;
pub mod sink;
pub mod telemetry;
pub mod types;

pub use crate::core::{WorkAssignment, WorkerOutcome, run_worker};
pub use error::PzipError;
pub use format::RunFormat;
pub use io::MmapInput;
pub use pipeline::{CompressionPipeline, CoordinatorState, PipelineOptions, validate_inputs};
pub use report::{FileOutcome, FileReport, RunReport, RunStatus, RunSummary};
pub use rle::{RunEncoder, encode};
pub use sink::{OutputSink, SinkStats};
pub use telemetry::{DefaultWorkerTelemetry, WorkerTelemetry};
pub use types::{Result, Run};

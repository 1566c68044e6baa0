pub mod worker;

pub use worker::{WorkAssignment, WorkerOutcome, run_worker};

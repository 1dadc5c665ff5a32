//! Background task execution.

mod tokio_runner;

pub use tokio_runner::{TaskRunnerConfig, TokioTaskRunner};

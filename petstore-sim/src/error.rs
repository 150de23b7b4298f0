//! Simulation error types

use thiserror::Error;

/// Errors that stop the simulation machinery itself.
///
/// Per-request failures never surface here; they are absorbed into
/// metrics and the loop moves on.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Entity tracker is no longer running")]
    TrackerClosed,

    #[error("Worker task failed: {0}")]
    WorkerPanic(String),
}

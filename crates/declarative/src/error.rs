//! Error types for plan execution

use thiserror::Error;

/// Errors surfaced by a finished run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A step failed while being applied; later steps were not attempted
    #[error("step {index} ({step}) failed: {message}")]
    StepExecutionFailure {
        /// Zero-based position of the step in the plan
        index: usize,
        /// Qualified id of the failing step (`kind:id`)
        step: String,
        /// Underlying OS, network, or process error
        message: String,
    },
}

/// Result type for execution outcomes
pub type Result<T> = std::result::Result<T, Error>;

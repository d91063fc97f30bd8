// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Rhetoric Kernel failures.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Invalid input (text, feedback request, parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A pattern definition or phrase could not be compiled.
    #[error("pattern error: {pattern_id}: {reason}")]
    Pattern { pattern_id: String, reason: String },

    /// A single detector failed. Never aborts a batch.
    #[error("detector '{detector}' failed: {reason}")]
    Detector { detector: String, reason: String },

    /// Durable adjustment storage failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type GuardResult<T> = Result<T, GuardError>;

impl From<std::io::Error> for GuardError {
    fn from(e: std::io::Error) -> Self {
        GuardError::Persistence(e.to_string())
    }
}

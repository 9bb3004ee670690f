//! Error types for the compute engine.
//!
//! Malformed numeric content never produces an error (it coerces to zero);
//! only malformed shapes do.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

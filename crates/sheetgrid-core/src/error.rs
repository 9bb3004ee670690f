//! Error types for the sheet service.

use thiserror::Error;

use sheetgrid_engine::engine::{CellId, EngineError, MAX_GRID_INDEX};

use crate::store::StoreError;

/// Errors surfaced to callers of [`Sheet`](crate::Sheet).
///
/// Store failures stay distinguishable from bad input so a caller can tell
/// "no data" apart from "data layer down".
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Value must be a number for numeric cells: {value:?} at row {row}, column {column}")]
    TypeMismatch {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Cell at row {row}, column {column} is outside the grid (max index {max})", max = MAX_GRID_INDEX)]
    OutOfBounds { row: usize, column: usize },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[source] regex::Error),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("Cell {0} not found")]
    CellNotFound(CellId),

    #[error("Cells changed while the operation ran (expected version {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },

    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EngineError> for SheetError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRange(msg) => SheetError::InvalidRange(msg),
            EngineError::InvalidPattern(err) => SheetError::InvalidPattern(err),
            EngineError::UnknownOperation(name) => SheetError::UnknownOperation(name),
        }
    }
}

impl From<StoreError> for SheetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SheetError::CellNotFound(id),
            StoreError::Conflict { expected, actual } => SheetError::Conflict { expected, actual },
            other => SheetError::StoreUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

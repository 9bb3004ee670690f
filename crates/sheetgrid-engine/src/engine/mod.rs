//! Cell-grid compute engine API.
//!
//! Everything here is a pure function of its inputs:
//!
//! - [`Cell`], [`DataType`], [`CellStyles`] - The stored cell record
//! - [`CellRef`] - Coordinates and A1 notation (A1 notation ↔ row/col indices)
//! - [`assemble`] - Sparse cells to a dense 2D [`DenseGrid`]
//! - [`evaluate`] - SUM/AVERAGE/MAX/MIN/COUNT over an explicit range
//! - [`transform`] - Bulk TRIM/UPPER/LOWER/REMOVE_DUPLICATES/FIND_AND_REPLACE
//! - [`lenient_number`] - The tolerant numeric parse used by aggregates
//! - [`EngineOptions`] - Resolution, coercion, dedup and find policies

mod aggregate;
mod cell;
mod cell_ref;
mod coerce;
mod error;
mod grid;
mod options;
mod quality;
mod resolve;

pub use aggregate::{Aggregate, evaluate};
pub use cell::{Cell, CellId, CellStyles, DataType};
pub use cell_ref::{CellRef, parse_range, parse_ref_list};
pub use coerce::{Coercion, is_numeric_text, lenient_number, strict_number};
pub use error::{EngineError, Result};
pub use grid::{DenseGrid, MAX_GRID_INDEX, assemble, in_bounds};
pub use options::EngineOptions;
pub use quality::{Dedup, FindMode, Transform, transform};
pub use resolve::{CellIndex, Resolution};

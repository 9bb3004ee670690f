//! Aggregate evaluation over an explicit list of coordinates.
//!
//! Each coordinate resolves to a number: the resolved cell's value coerced by
//! the configured [`Coercion`](super::Coercion), or `0` when nothing is
//! stored there. Garbage text never aborts a computation.

use std::fmt;
use std::str::FromStr;

use super::cell::Cell;
use super::cell_ref::CellRef;
use super::error::{EngineError, Result};
use super::options::EngineOptions;
use super::resolve::CellIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Sum,
    Average,
    Max,
    Min,
    /// Number of requested coordinates, populated or not.
    Count,
}

impl Aggregate {
    pub const ALL: [Aggregate; 5] = [
        Aggregate::Sum,
        Aggregate::Average,
        Aggregate::Max,
        Aggregate::Min,
        Aggregate::Count,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Average => "AVERAGE",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Count => "COUNT",
        }
    }

    /// Whether an empty range has no meaningful result.
    pub fn needs_values(&self) -> bool {
        matches!(self, Aggregate::Average | Aggregate::Max | Aggregate::Min)
    }
}

impl FromStr for Aggregate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Aggregate::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| EngineError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluate `op` over `range`.
///
/// AVERAGE, MAX and MIN reject an empty range with [`EngineError::InvalidRange`];
/// SUM and COUNT of an empty range are `0`.
pub fn evaluate(
    op: Aggregate,
    range: &[CellRef],
    cells: &[Cell],
    options: &EngineOptions,
) -> Result<f64> {
    if range.is_empty() && op.needs_values() {
        return Err(EngineError::InvalidRange(format!(
            "{} requires at least one coordinate",
            op
        )));
    }
    let index = CellIndex::build(cells, options.resolution);
    let values = range.iter().map(|cell_ref| {
        index
            .get(cell_ref)
            .map(|cell| options.coercion.coerce(&cell.value))
            .unwrap_or(0.0)
    });

    let result = match op {
        Aggregate::Sum => values.sum(),
        Aggregate::Average => values.sum::<f64>() / range.len() as f64,
        Aggregate::Max => values.fold(f64::NEG_INFINITY, f64::max),
        Aggregate::Min => values.fold(f64::INFINITY, f64::min),
        Aggregate::Count => range.len() as f64,
    };
    Ok(result)
}

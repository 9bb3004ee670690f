//! Sparse-to-dense grid assembly.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::cell_ref::CellRef;
use super::resolve::{CellIndex, Resolution};

/// Largest row or column index a grid can hold (Excel's row limit, 0-based).
/// Writes past it are rejected; [`assemble`] leaves such records out.
pub const MAX_GRID_INDEX: usize = 1_048_575;

/// Whether `(row, col)` lies inside the addressable grid.
pub fn in_bounds(row: usize, col: usize) -> bool {
    row <= MAX_GRID_INDEX && col <= MAX_GRID_INDEX
}

/// Length needed to hold `index`, if it is addressable.
fn slot_len(index: usize) -> Option<usize> {
    if index > MAX_GRID_INDEX {
        return None;
    }
    index.checked_add(1)
}

/// Dense 2D view of a cell collection.
///
/// Rows are ragged: row `r` is as long as its rightmost populated column.
/// Coordinates without a record are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenseGrid {
    rows: Vec<Vec<Option<String>>>,
}

impl DenseGrid {
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Option<String>>> {
        self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Populated coordinates in row-major order, gaps dropped.
    pub fn flatten(&self) -> Vec<(CellRef, &str)> {
        let mut out = Vec::new();
        for (row, cols) in self.rows.iter().enumerate() {
            for (col, value) in cols.iter().enumerate() {
                if let Some(value) = value {
                    out.push((CellRef::new(row, col), value.as_str()));
                }
            }
        }
        out
    }
}

/// Build the dense view of `cells`. Duplicate coordinates resolve per `resolution`.
/// Records outside [`MAX_GRID_INDEX`] are skipped.
pub fn assemble(cells: &[Cell], resolution: Resolution) -> DenseGrid {
    let index = CellIndex::build(cells, resolution);
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for (cell_ref, cell) in index.iter() {
        let (Some(height), Some(width)) = (slot_len(cell_ref.row), slot_len(cell_ref.col)) else {
            continue;
        };
        if rows.len() < height {
            rows.resize_with(height, Vec::new);
        }
        let row = &mut rows[cell_ref.row];
        if row.len() < width {
            row.resize(width, None);
        }
        row[cell_ref.col] = Some(cell.value.clone());
    }

    DenseGrid { rows }
}

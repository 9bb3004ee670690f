//! Coordinate resolution.
//!
//! Storage may hold several records for one `(row, column)`. Grid assembly and
//! aggregate evaluation both resolve a coordinate through [`CellIndex`] so they
//! always agree on which record a coordinate means.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::cell::Cell;
use super::cell_ref::CellRef;

/// Which record wins when a coordinate is stored more than once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The record latest in collection order.
    #[default]
    LastWrite,
    /// The record earliest in collection order.
    FirstMatch,
}

/// Coordinate lookup over a borrowed cell collection.
pub struct CellIndex<'a> {
    by_ref: HashMap<CellRef, &'a Cell>,
}

impl<'a> CellIndex<'a> {
    pub fn build(cells: &'a [Cell], resolution: Resolution) -> Self {
        let mut by_ref = HashMap::with_capacity(cells.len());
        for cell in cells {
            match resolution {
                Resolution::LastWrite => {
                    by_ref.insert(cell.cell_ref(), cell);
                }
                Resolution::FirstMatch => {
                    by_ref.entry(cell.cell_ref()).or_insert(cell);
                }
            }
        }
        CellIndex { by_ref }
    }

    pub fn get(&self, cell_ref: &CellRef) -> Option<&'a Cell> {
        self.by_ref.get(cell_ref).copied()
    }

    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }

    /// Resolved cells in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &'a Cell)> + '_ {
        self.by_ref.iter().map(|(r, c)| (r, *c))
    }
}

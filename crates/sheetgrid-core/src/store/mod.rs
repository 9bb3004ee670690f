//! Cell store contract and implementations.
//!
//! Storage is an append-only log of cell records: writing a coordinate twice
//! keeps both records and readers resolve the coordinate to the latest one.
//! `update_by_id` is the only in-place edit.
//!
//! Every mutation bumps the store version. [`CellStore::replace_all`] takes the
//! version the caller read so a bulk read-modify-write can detect a concurrent
//! writer instead of silently overwriting it.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use sheetgrid_engine::engine::{Cell, CellId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cell {0} not found")]
    NotFound(CellId),

    #[error("Version conflict (expected {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The full cell collection at one version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub cells: Vec<Cell>,
}

/// Persistence collaborator for the sheet service.
pub trait CellStore: Send + Sync {
    /// The full collection, in write order, with its version.
    fn snapshot(&self) -> StoreResult<Snapshot>;

    fn list(&self) -> StoreResult<Vec<Cell>> {
        Ok(self.snapshot()?.cells)
    }

    /// Store a new record and return it with its assigned id.
    fn append(&self, cell: Cell) -> StoreResult<Cell>;

    /// Overwrite the whole collection. When `expected_version` is set and the
    /// store has moved on, nothing is written and `Conflict` is returned.
    /// Returns the new version.
    fn replace_all(&self, cells: Vec<Cell>, expected_version: Option<u64>) -> StoreResult<u64>;

    /// Change the value of one stored record.
    fn update_by_id(&self, id: CellId, value: &str) -> StoreResult<Cell>;
}

impl<S: CellStore + ?Sized> CellStore for Arc<S> {
    fn snapshot(&self) -> StoreResult<Snapshot> {
        (**self).snapshot()
    }

    fn list(&self) -> StoreResult<Vec<Cell>> {
        (**self).list()
    }

    fn append(&self, cell: Cell) -> StoreResult<Cell> {
        (**self).append(cell)
    }

    fn replace_all(&self, cells: Vec<Cell>, expected_version: Option<u64>) -> StoreResult<u64> {
        (**self).replace_all(cells, expected_version)
    }

    fn update_by_id(&self, id: CellId, value: &str) -> StoreResult<Cell> {
        (**self).update_by_id(id, value)
    }
}

/// Store contents shared by the in-memory and file stores.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreState {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub last_id: CellId,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl StoreState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            cells: self.cells.clone(),
        }
    }

    fn next_id(&mut self) -> CellId {
        self.last_id += 1;
        self.last_id
    }

    pub fn append(&mut self, mut cell: Cell) -> Cell {
        cell.id = Some(self.next_id());
        self.cells.push(cell.clone());
        self.version += 1;
        cell
    }

    /// Seed a fresh state with `cells`, assigning ids where they are missing.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        let mut state = StoreState::default();
        state.overwrite(cells);
        state
    }

    pub fn replace_all(
        &mut self,
        cells: Vec<Cell>,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        if let Some(expected) = expected_version
            && expected != self.version
        {
            return Err(StoreError::Conflict {
                expected,
                actual: self.version,
            });
        }
        Ok(self.overwrite(cells))
    }

    /// Unconditional replace; returns the new version.
    fn overwrite(&mut self, mut cells: Vec<Cell>) -> u64 {
        for cell in &cells {
            if let Some(id) = cell.id {
                self.last_id = self.last_id.max(id);
            }
        }
        for cell in &mut cells {
            if cell.id.is_none() {
                cell.id = Some(self.next_id());
            }
        }
        self.cells = cells;
        self.version += 1;
        self.version
    }

    pub fn update_by_id(&mut self, id: CellId, value: &str) -> StoreResult<Cell> {
        let cell = self
            .cells
            .iter_mut()
            .find(|cell| cell.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        cell.value = value.to_string();
        let updated = cell.clone();
        self.version += 1;
        Ok(updated)
    }
}

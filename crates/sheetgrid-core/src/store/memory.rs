use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sheetgrid_engine::engine::{Cell, CellId};

use super::{CellStore, Snapshot, StoreError, StoreResult, StoreState};

/// Process-local store. Cheap to create, gone when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records, assigning ids where they are missing.
    pub fn with_cells(cells: Vec<Cell>) -> Self {
        MemoryStore {
            state: RwLock::new(StoreState::from_cells(cells)),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl CellStore for MemoryStore {
    fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(self.read()?.snapshot())
    }

    fn list(&self) -> StoreResult<Vec<Cell>> {
        Ok(self.read()?.cells.clone())
    }

    fn append(&self, cell: Cell) -> StoreResult<Cell> {
        Ok(self.write()?.append(cell))
    }

    fn replace_all(&self, cells: Vec<Cell>, expected_version: Option<u64>) -> StoreResult<u64> {
        self.write()?.replace_all(cells, expected_version)
    }

    fn update_by_id(&self, id: CellId, value: &str) -> StoreResult<Cell> {
        self.write()?.update_by_id(id, value)
    }
}

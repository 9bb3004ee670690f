//! JSON document store.
//!
//! The whole store is one JSON document (`{"version", "lastId", "cells"}`),
//! read on every call and rewritten through a temp file + rename. Writers in
//! one process are serialized; writers in different processes rely on the
//! version check in `replace_all`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sheetgrid_engine::engine::{Cell, CellId};

use super::{CellStore, Snapshot, StoreError, StoreResult, StoreState};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store backed by `path`. The file is created on the first write; a
    /// missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<StoreState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreState::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(StoreState::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            StoreError::Unavailable(format!("{} is not a cell store: {}", self.path.display(), e))
        })
    }

    fn save(&self, state: &StoreState) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Unavailable(format!("cannot encode cells: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content + "\n")?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            version = state.version,
            cells = state.cells.len(),
            "saved cell store"
        );
        Ok(())
    }

    /// Load, change and save under the write lock.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.save(&state)?;
        Ok(out)
    }
}

impl CellStore for JsonFileStore {
    fn snapshot(&self) -> StoreResult<Snapshot> {
        let state = self.load()?;
        Ok(Snapshot {
            version: state.version,
            cells: state.cells,
        })
    }

    fn append(&self, cell: Cell) -> StoreResult<Cell> {
        self.mutate(|state| Ok(state.append(cell)))
    }

    fn replace_all(&self, cells: Vec<Cell>, expected_version: Option<u64>) -> StoreResult<u64> {
        self.mutate(|state| state.replace_all(cells, expected_version))
    }

    fn update_by_id(&self, id: CellId, value: &str) -> StoreResult<Cell> {
        self.mutate(|state| state.update_by_id(id, value))
    }
}

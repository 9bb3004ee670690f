use std::io::Write;

use sheetgrid_engine::engine::{Cell, CellRef};

use super::Sheet;
use crate::error::Result;
use crate::storage::{parse_csv, write_csv};
use crate::store::CellStore;

impl<S: CellStore> Sheet<S> {
    /// Append every non-empty CSV field as a new cell, starting at `origin`.
    ///
    /// The whole text is parsed before anything is written.
    pub fn import_csv(&self, content: &str, origin: CellRef) -> Result<Vec<Cell>> {
        let new_cells = parse_csv(content, origin)?;
        let mut stored = Vec::with_capacity(new_cells.len());
        for new_cell in new_cells {
            stored.push(self.create_cell(new_cell)?);
        }
        tracing::info!(cells = stored.len(), origin = %origin, "imported CSV");
        Ok(stored)
    }

    /// Write the dense grid as CSV.
    pub fn export_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        let grid = self.dense()?;
        write_csv(out, &grid)
    }
}

use sheetgrid_engine::engine::{
    Aggregate, Cell, CellId, CellRef, DataType, DenseGrid, Transform, assemble, evaluate,
    in_bounds, is_numeric_text, transform,
};

use super::request::{CalculateRequest, CalculateResponse, DataQualityRequest, NewCell, parse_range_value};
use super::{Sheet, UnknownOperation};
use crate::error::{Result, SheetError};
use crate::store::CellStore;

fn check_numeric(cell: &Cell, value: &str) -> Result<()> {
    if cell.data_type == DataType::Number && !is_numeric_text(value) {
        return Err(SheetError::TypeMismatch {
            row: cell.row,
            column: cell.column,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl<S: CellStore> Sheet<S> {
    /// All stored records in write order.
    pub fn cells(&self) -> Result<Vec<Cell>> {
        Ok(self.store.list()?)
    }

    /// The stored records as a dense grid.
    pub fn dense(&self) -> Result<DenseGrid> {
        let cells = self.cells()?;
        Ok(assemble(&cells, self.options.engine.resolution))
    }

    /// Store a new cell. Numeric cells must hold numeric text.
    pub fn create_cell(&self, new_cell: NewCell) -> Result<Cell> {
        let cell = new_cell.into_cell();
        if !in_bounds(cell.row, cell.column) {
            return Err(SheetError::OutOfBounds {
                row: cell.row,
                column: cell.column,
            });
        }
        check_numeric(&cell, &cell.value)?;
        let stored = self.store.append(cell)?;
        tracing::debug!(
            id = ?stored.id,
            row = stored.row,
            column = stored.column,
            "created cell"
        );
        Ok(stored)
    }

    /// Change the value of one stored cell, keeping its declared type honest.
    pub fn update_cell(&self, id: CellId, value: &str) -> Result<Cell> {
        let cells = self.cells()?;
        let existing = cells
            .iter()
            .find(|cell| cell.id == Some(id))
            .ok_or(SheetError::CellNotFound(id))?;
        check_numeric(existing, value)?;
        let updated = self.store.update_by_id(id, value)?;
        tracing::debug!(id, "updated cell");
        Ok(updated)
    }

    /// Evaluate a typed aggregate over stored cells.
    pub fn aggregate(&self, op: Aggregate, range: &[CellRef]) -> Result<f64> {
        let cells = self.cells()?;
        let result = evaluate(op, range, &cells, &self.options.engine)?;
        tracing::debug!(
            operation = op.name(),
            coordinates = range.len(),
            cells = cells.len(),
            result,
            "evaluated aggregate"
        );
        Ok(result)
    }

    /// Handle a calculate request.
    ///
    /// The range shape is always checked. An unknown operation name yields `0`
    /// under [`UnknownOperation::Fallback`].
    pub fn calculate(&self, request: &CalculateRequest) -> Result<CalculateResponse> {
        let range = parse_range_value(&request.range)?;
        let op = match request.operation.parse::<Aggregate>() {
            Ok(op) => op,
            Err(err) => {
                return match self.options.unknown_operation {
                    UnknownOperation::Fallback => {
                        tracing::warn!(
                            operation = %request.operation,
                            "unknown aggregate, returning 0"
                        );
                        Ok(CalculateResponse { result: 0.0 })
                    }
                    UnknownOperation::Reject => Err(err.into()),
                };
            }
        };
        let result = self.aggregate(op, &range)?;
        Ok(CalculateResponse { result })
    }

    /// Run a typed transform over the whole collection and write it back.
    ///
    /// The write is guarded by the version read, so a concurrent writer makes
    /// this fail with [`SheetError::Conflict`] instead of losing its change.
    pub fn apply_transform(&self, op: &Transform) -> Result<Vec<Cell>> {
        let snapshot = self.store.snapshot()?;
        let before = snapshot.cells.len();
        let cells = transform(op, &snapshot.cells, &self.options.engine)?;

        match self.store.replace_all(cells.clone(), Some(snapshot.version)) {
            Ok(version) => {
                tracing::debug!(
                    operation = op.name(),
                    before,
                    after = cells.len(),
                    version,
                    "applied transform"
                );
                Ok(cells)
            }
            Err(err) => {
                let err = SheetError::from(err);
                if let SheetError::Conflict { expected, actual } = err {
                    tracing::warn!(
                        operation = op.name(),
                        expected,
                        actual,
                        "cells changed during transform, nothing written"
                    );
                }
                Err(err)
            }
        }
    }

    /// Handle a data-quality request. An unknown operation name returns the
    /// current cells untouched under [`UnknownOperation::Fallback`].
    pub fn data_quality(&self, request: &DataQualityRequest) -> Result<Vec<Cell>> {
        let op = Transform::from_name(
            &request.operation,
            request.find_text.as_deref(),
            request.replace_text.as_deref(),
        );
        match (op, self.options.unknown_operation) {
            (Some(op), _) => self.apply_transform(&op),
            (None, UnknownOperation::Fallback) => {
                tracing::warn!(
                    operation = %request.operation,
                    "unknown data-quality operation, returning cells unchanged"
                );
                self.cells()
            }
            (None, UnknownOperation::Reject) => {
                Err(SheetError::UnknownOperation(request.operation.clone()))
            }
        }
    }
}

//! sheetgrid-core - UI-agnostic cell service + storage.

pub mod error;
pub mod sheet;
pub mod storage;
pub mod store;

pub use error::{Result, SheetError};
pub use sheet::{
    CalculateRequest, CalculateResponse, DataQualityRequest, NewCell, Sheet, SheetOptions,
    UnknownOperation, parse_range_value,
};
pub use store::{CellStore, JsonFileStore, MemoryStore, Snapshot, StoreError};

pub use sheetgrid_engine::engine::{
    Aggregate, Cell, CellId, CellRef, CellStyles, DataType, DenseGrid, EngineOptions, Transform,
};

//! Sheet service (UI- and transport-agnostic).
//!
//! [`Sheet`] is what a transport calls into: it reads from a [`CellStore`],
//! runs the pure engine functions and writes results back.

mod io;
mod ops;
mod request;

pub use request::{
    CalculateRequest, CalculateResponse, DataQualityRequest, NewCell, parse_range_value,
};

use serde::{Deserialize, Serialize};

use sheetgrid_engine::engine::EngineOptions;

use crate::store::CellStore;

/// What to do with an operation name the engine does not know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOperation {
    /// Aggregates yield `0`, transforms return the cells unchanged.
    #[default]
    Fallback,
    /// Fail with [`SheetError::UnknownOperation`](crate::SheetError::UnknownOperation).
    Reject,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SheetOptions {
    pub engine: EngineOptions,
    pub unknown_operation: UnknownOperation,
}

/// A cell collection behind a store.
pub struct Sheet<S: CellStore> {
    store: S,
    options: SheetOptions,
}

impl<S: CellStore> Sheet<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, SheetOptions::default())
    }

    pub fn with_options(store: S, options: SheetOptions) -> Self {
        Sheet { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }
}

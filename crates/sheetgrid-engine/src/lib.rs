//! sheetgrid_engine - Pure cell-grid compute engine.

pub mod engine;

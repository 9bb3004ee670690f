//! File formats for moving cells in and out of a sheet.

pub mod csv;

pub use csv::{parse_csv, write_csv};

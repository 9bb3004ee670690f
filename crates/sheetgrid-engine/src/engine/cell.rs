//! The stored cell record.
//!
//! A [`Cell`] always carries its content as text. `data_type`, `dependencies`
//! and `styles` are stored and returned but never read by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cell_ref::CellRef;

/// Identifier assigned by a cell store.
pub type CellId = u64;

/// Declared type of a cell's content. Advisory only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    #[default]
    Text,
    Date,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Number => "number",
            DataType::Text => "text",
            DataType::Date => "date",
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(DataType::Number),
            "text" => Ok(DataType::Text),
            "date" => Ok(DataType::Date),
            other => Err(format!("Invalid data type: {}", other)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Passive formatting metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CellStyles {
    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.italic.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}

/// One addressed unit of grid content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CellId>,
    pub row: usize,
    pub column: usize,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<CellStyles>,
}

impl Cell {
    /// Create an unsaved text cell.
    pub fn new(row: usize, column: usize, value: impl Into<String>) -> Cell {
        Cell {
            id: None,
            row,
            column,
            value: value.into(),
            data_type: DataType::Text,
            dependencies: Vec::new(),
            styles: None,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Cell {
        self.data_type = data_type;
        self
    }

    pub fn with_id(mut self, id: CellId) -> Cell {
        self.id = Some(id);
        self
    }

    pub fn cell_ref(&self) -> CellRef {
        CellRef::new(self.row, self.column)
    }

    /// Copy of this cell with a different value; every other field is kept.
    pub fn with_value(&self, value: String) -> Cell {
        Cell {
            value,
            ..self.clone()
        }
    }
}

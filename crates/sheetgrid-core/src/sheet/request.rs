//! Request and response shapes, named as on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sheetgrid_engine::engine::{Cell, CellRef, CellStyles, DataType};

use crate::error::{Result, SheetError};

/// Body of a cell write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCell {
    pub row: usize,
    pub column: usize,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<CellStyles>,
}

impl NewCell {
    pub fn new(row: usize, column: usize, value: impl Into<String>) -> Self {
        NewCell {
            row,
            column,
            value: value.into(),
            data_type: None,
            dependencies: Vec::new(),
            styles: None,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn into_cell(self) -> Cell {
        Cell {
            id: None,
            row: self.row,
            column: self.column,
            value: self.value,
            data_type: self.data_type.unwrap_or_default(),
            dependencies: self.dependencies,
            styles: self.styles.filter(|s| !s.is_empty()),
        }
    }
}

/// Body of an aggregate request. `range` is kept as raw JSON so a malformed
/// shape is reported as an invalid range rather than a decoding failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub operation: String,
    #[serde(default)]
    pub range: Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub result: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityRequest {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_text: Option<String>,
}

impl DataQualityRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        DataQualityRequest {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn find_and_replace(find: impl Into<String>, replace: impl Into<String>) -> Self {
        DataQualityRequest {
            operation: "FIND_AND_REPLACE".to_string(),
            find_text: Some(find.into()),
            replace_text: Some(replace.into()),
        }
    }
}

/// Read a JSON range: an array of `[row, column]` pairs of non-negative integers.
pub fn parse_range_value(value: &Value) -> Result<Vec<CellRef>> {
    let Value::Array(entries) = value else {
        return Err(SheetError::InvalidRange(
            "range must be an array of [row, column] pairs".to_string(),
        ));
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.as_array().map(Vec::as_slice) {
            Some([row, column]) => {
                let row = coordinate(row, i)?;
                let column = coordinate(column, i)?;
                Ok(CellRef::new(row, column))
            }
            _ => Err(SheetError::InvalidRange(format!(
                "range entry {} is not a [row, column] pair: {}",
                i, entry
            ))),
        })
        .collect()
}

fn coordinate(value: &Value, entry: usize) -> Result<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            SheetError::InvalidRange(format!(
                "range entry {} has a coordinate that is not a non-negative integer: {}",
                entry, value
            ))
        })
}

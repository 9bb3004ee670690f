//! CSV import/export functionality

use std::io::Write;

use sheetgrid_engine::engine::{CellRef, DataType, DenseGrid, in_bounds, is_numeric_text};

use crate::error::{Result, SheetError};
use crate::sheet::NewCell;

/// Parse CSV text into cell writes, placing the first field at `origin`.
/// Empty fields are skipped.
pub fn parse_csv(content: &str, origin: CellRef) -> Result<Vec<NewCell>> {
    let mut cells = Vec::new();

    for (row_idx, line) in content.lines().enumerate() {
        let fields = parse_csv_line(line).map_err(|message| SheetError::Csv {
            line: row_idx + 1,
            message,
        })?;
        for (col_idx, field) in fields.into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            let row = origin.row.saturating_add(row_idx);
            let column = origin.col.saturating_add(col_idx);
            if !in_bounds(row, column) {
                return Err(SheetError::OutOfBounds { row, column });
            }
            let data_type = csv_field_type(&field);
            cells.push(NewCell::new(row, column, field).with_data_type(data_type));
        }
    }

    Ok(cells)
}

/// Parse a single CSV line, handling quoted fields
pub(crate) fn parse_csv_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    if field_was_quoted {
                        fields.push(std::mem::take(&mut current));
                    } else {
                        fields.push(current.trim().to_string());
                        current.clear();
                    }
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if field_was_quoted {
        fields.push(current);
    } else {
        fields.push(current.trim().to_string());
    }
    Ok(fields)
}

/// Declared type for an imported field.
/// - Valid number -> Number (unless it has leading zeros like "007")
/// - Surrounding whitespace or anything else -> Text
fn csv_field_type(field: &str) -> DataType {
    let trimmed = field.trim();
    if field != trimmed {
        return DataType::Text;
    }

    // Keep strings like "007" as text, but not "0" or "0.5".
    if trimmed.starts_with('0')
        && trimmed.len() > 1
        && !trimmed.starts_with("0.")
        && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return DataType::Text;
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && is_numeric_text(trimmed) => DataType::Number,
        _ => DataType::Text,
    }
}

/// Write a dense grid as rectangular CSV. Gaps become empty fields.
pub fn write_csv<W: Write>(out: &mut W, grid: &DenseGrid) -> Result<()> {
    let width = grid.width();
    for row in grid.rows() {
        let fields: Vec<String> = (0..width)
            .map(|col| {
                row.get(col)
                    .and_then(|v| v.as_deref())
                    .map(escape_csv_field)
                    .unwrap_or_default()
            })
            .collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}

//! Cell coordinates and A1 notation.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates, plus
//! expansion of `A1:B3` rectangles into the explicit coordinate lists that
//! aggregates take.
//!
//! # Examples
//!
//! ```
//! use sheetgrid_engine::engine::CellRef;
//!
//! let cell = CellRef::from_a1("B3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const MAX_RANGE_CELLS: usize = 1_000_000;

/// A cell coordinate by row and column indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    pub fn from_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name.trim())?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

/// Expand a rectangle like "A1:B3" into its coordinates, row by row.
/// A single reference ("C2") expands to itself.
pub fn parse_range(range: &str) -> Option<Vec<CellRef>> {
    let Some((start, end)) = range.split_once(':') else {
        return CellRef::from_a1(range).map(|r| vec![r]);
    };
    let start = CellRef::from_a1(start)?;
    let end = CellRef::from_a1(end)?;

    let min_row = start.row.min(end.row);
    let max_row = start.row.max(end.row);
    let min_col = start.col.min(end.col);
    let max_col = start.col.max(end.col);

    let row_count = max_row - min_row + 1;
    let col_count = max_col - min_col + 1;
    let cell_count = row_count.checked_mul(col_count)?;
    if cell_count > MAX_RANGE_CELLS {
        return None;
    }

    let mut refs = Vec::with_capacity(cell_count);
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            refs.push(CellRef::new(row, col));
        }
    }
    Some(refs)
}

/// Parse a comma separated list of references and rectangles ("A1,B2:B4").
/// Order is preserved and repeats are kept.
pub fn parse_ref_list(list: &str) -> Option<Vec<CellRef>> {
    let mut refs = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        refs.extend(parse_range(part)?);
        if refs.len() > MAX_RANGE_CELLS {
            return None;
        }
    }
    Some(refs)
}

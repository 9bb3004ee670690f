//! Bulk data-quality transforms over a whole cell collection.
//!
//! Every transform returns a new collection; only `value` changes, except
//! REMOVE_DUPLICATES, which drops records.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

use super::cell::{Cell, DataType};
use super::error::Result;
use super::options::EngineOptions;

/// What counts as a duplicate for REMOVE_DUPLICATES.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dedup {
    /// Every field but the store id matches.
    #[default]
    Structural,
    /// Same `"{row}-{column} -{value}"` key. Ignores metadata.
    LegacyKey,
}

/// How FIND_AND_REPLACE interprets its find text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindMode {
    #[default]
    Literal,
    /// Regular expression. The replacement uses JavaScript syntax: `$&` is
    /// the match, `$1`..`$99` and `$<name>` are groups, `$$` is a dollar.
    /// Any other `$` is literal text.
    Pattern,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    Trim,
    Upper,
    Lower,
    RemoveDuplicates,
    FindAndReplace { find: String, replace: String },
}

impl Transform {
    pub const NAMES: [&'static str; 5] =
        ["TRIM", "UPPER", "LOWER", "REMOVE_DUPLICATES", "FIND_AND_REPLACE"];

    /// Build a transform from its request name. Missing find text makes
    /// FIND_AND_REPLACE a no-op; missing replace text means delete.
    pub fn from_name(name: &str, find: Option<&str>, replace: Option<&str>) -> Option<Transform> {
        let transform = match name {
            "TRIM" => Transform::Trim,
            "UPPER" => Transform::Upper,
            "LOWER" => Transform::Lower,
            "REMOVE_DUPLICATES" => Transform::RemoveDuplicates,
            "FIND_AND_REPLACE" => Transform::FindAndReplace {
                find: find.unwrap_or_default().to_string(),
                replace: replace.unwrap_or_default().to_string(),
            },
            _ => return None,
        };
        Some(transform)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transform::Trim => "TRIM",
            Transform::Upper => "UPPER",
            Transform::Lower => "LOWER",
            Transform::RemoveDuplicates => "REMOVE_DUPLICATES",
            Transform::FindAndReplace { .. } => "FIND_AND_REPLACE",
        }
    }
}

/// Apply `op` to every cell.
///
/// Fails only for an uncompilable pattern in [`FindMode::Pattern`].
pub fn transform(op: &Transform, cells: &[Cell], options: &EngineOptions) -> Result<Vec<Cell>> {
    let out = match op {
        Transform::Trim => map_values(cells, |v| Cow::Borrowed(v.trim())),
        Transform::Upper => map_values(cells, |v| Cow::Owned(v.to_uppercase())),
        Transform::Lower => map_values(cells, |v| Cow::Owned(v.to_lowercase())),
        Transform::RemoveDuplicates => remove_duplicates(cells, options.dedup),
        Transform::FindAndReplace { find, replace } => {
            find_and_replace(cells, find, replace, options.find_mode)?
        }
    };
    Ok(out)
}

fn map_values<F>(cells: &[Cell], f: F) -> Vec<Cell>
where
    F: for<'v> Fn(&'v str) -> Cow<'v, str>,
{
    cells
        .iter()
        .map(|cell| match f(&cell.value) {
            Cow::Borrowed(v) if v == cell.value => cell.clone(),
            v => cell.with_value(v.into_owned()),
        })
        .collect()
}

fn find_and_replace(cells: &[Cell], find: &str, replace: &str, mode: FindMode) -> Result<Vec<Cell>> {
    if find.is_empty() {
        return Ok(cells.to_vec());
    }
    match mode {
        FindMode::Literal => Ok(map_values(cells, |v| {
            if v.contains(find) {
                Cow::Owned(v.replace(find, replace))
            } else {
                Cow::Borrowed(v)
            }
        })),
        FindMode::Pattern => {
            let re = Regex::new(find)?;
            let replacement = expand_js_replacement(replace, re.captures_len());
            Ok(map_values(cells, |v| re.replace_all(v, replacement.as_str())))
        }
    }
}

/// Rewrite a JavaScript replacement string into the regex crate's `${..}`
/// form. `groups` counts group 0, as [`Regex::captures_len`] does.
fn expand_js_replacement(replace: &str, groups: usize) -> String {
    let mut out = String::with_capacity(replace.len() + 8);
    let mut rest = replace;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let bytes = after.as_bytes();
        let consumed = match bytes.first() {
            Some(b'$') => {
                out.push_str("$$");
                1
            }
            Some(b'&') => {
                out.push_str("${0}");
                1
            }
            Some(b'<') => match after.find('>') {
                Some(end) => {
                    out.push_str("${");
                    out.push_str(&after[1..end]);
                    out.push('}');
                    end + 1
                }
                None => {
                    out.push_str("$$");
                    0
                }
            },
            Some(&d) if d.is_ascii_digit() => {
                let one = usize::from(d - b'0');
                let two = bytes
                    .get(1)
                    .filter(|b| b.is_ascii_digit())
                    .map(|&b| one * 10 + usize::from(b - b'0'));
                match two {
                    Some(n) if (1..groups).contains(&n) => {
                        out.push_str(&format!("${{{}}}", n));
                        2
                    }
                    _ if (1..groups).contains(&one) => {
                        out.push_str(&format!("${{{}}}", one));
                        1
                    }
                    _ => {
                        out.push_str("$$");
                        0
                    }
                }
            }
            _ => {
                out.push_str("$$");
                0
            }
        };
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

fn remove_duplicates(cells: &[Cell], dedup: Dedup) -> Vec<Cell> {
    match dedup {
        Dedup::Structural => {
            let mut seen = HashSet::with_capacity(cells.len());
            cells
                .iter()
                .filter(|&cell| seen.insert(ContentKey::of(cell)))
                .cloned()
                .collect()
        }
        Dedup::LegacyKey => {
            let mut seen = HashSet::with_capacity(cells.len());
            cells
                .iter()
                .filter(|cell| seen.insert(format!("{}-{} -{}", cell.row, cell.column, cell.value)))
                .cloned()
                .collect()
        }
    }
}

/// Hashable view of everything in a cell except its id.
#[derive(Hash, PartialEq, Eq)]
struct ContentKey<'a> {
    row: usize,
    column: usize,
    value: &'a str,
    data_type: DataType,
    dependencies: &'a [String],
    bold: Option<bool>,
    italic: Option<bool>,
    font_size: Option<u64>,
    color: Option<&'a str>,
    has_styles: bool,
}

impl<'a> ContentKey<'a> {
    fn of(cell: &'a Cell) -> Self {
        let styles = cell.styles.as_ref();
        ContentKey {
            row: cell.row,
            column: cell.column,
            value: &cell.value,
            data_type: cell.data_type,
            dependencies: &cell.dependencies,
            bold: styles.and_then(|s| s.bold),
            italic: styles.and_then(|s| s.italic),
            font_size: styles.and_then(|s| s.font_size).map(f64::to_bits),
            color: styles.and_then(|s| s.color.as_deref()),
            has_styles: styles.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CellStyles, EngineError};

    fn run(op: Transform, cells: &[Cell]) -> Vec<Cell> {
        transform(&op, cells, &EngineOptions::default()).unwrap()
    }

    fn values(cells: &[Cell]) -> Vec<&str> {
        cells.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_trim_keeps_other_fields() {
        let cell = Cell::new(4, 2, "  hi  ").with_id(11).with_data_type(DataType::Date);
        let out = run(Transform::Trim, &[cell]);
        assert_eq!(out[0].value, "hi");
        assert_eq!(out[0].id, Some(11));
        assert_eq!(out[0].data_type, DataType::Date);
        assert_eq!((out[0].row, out[0].column), (4, 2));
    }

    #[test]
    fn test_upper_lower() {
        let cells = vec![Cell::new(0, 0, "MiXed ß")];
        assert_eq!(values(&run(Transform::Upper, &cells)), vec!["MIXED SS"]);
        assert_eq!(values(&run(Transform::Lower, &cells)), vec!["mixed ß"]);
    }

    #[test]
    fn test_upper_is_idempotent() {
        let cells = vec![Cell::new(0, 0, "abc"), Cell::new(0, 1, "Déjà vu"), Cell::new(1, 0, "")];
        let once = run(Transform::Upper, &cells);
        let twice = run(Transform::Upper, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let cells = vec![Cell::new(0, 0, "x"), Cell::new(0, 0, "x"), Cell::new(0, 1, "y")];
        let out = run(Transform::RemoveDuplicates, &cells);
        assert_eq!(out, vec![Cell::new(0, 0, "x"), Cell::new(0, 1, "y")]);
    }

    #[test]
    fn test_remove_duplicates_ignores_ids() {
        let cells = vec![Cell::new(0, 0, "x").with_id(1), Cell::new(0, 0, "x").with_id(2)];
        let out = run(Transform::RemoveDuplicates, &cells);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, Some(1));
    }

    #[test]
    fn test_structural_dedup_respects_metadata() {
        let styled = Cell {
            styles: Some(CellStyles {
                bold: Some(true),
                ..CellStyles::default()
            }),
            ..Cell::new(0, 0, "x")
        };
        let cells = vec![Cell::new(0, 0, "x"), styled.clone()];
        assert_eq!(run(Transform::RemoveDuplicates, &cells).len(), 2);

        let legacy = EngineOptions {
            dedup: Dedup::LegacyKey,
            ..EngineOptions::default()
        };
        let out = transform(&Transform::RemoveDuplicates, &cells, &legacy).unwrap();
        assert_eq!(out, vec![Cell::new(0, 0, "x")]);
    }

    #[test]
    fn test_legacy_key_keeps_same_value_at_other_coordinates() {
        let cells = vec![Cell::new(1, 2, "v"), Cell::new(12, 0, "v"), Cell::new(1, 2, "v")];
        let legacy = EngineOptions {
            dedup: Dedup::LegacyKey,
            ..EngineOptions::default()
        };
        let out = transform(&Transform::RemoveDuplicates, &cells, &legacy).unwrap();
        assert_eq!(out, vec![Cell::new(1, 2, "v"), Cell::new(12, 0, "v")]);
    }

    #[test]
    fn test_find_and_replace_global() {
        let cells = vec![Cell::new(0, 0, "foofoo"), Cell::new(0, 1, "Foo")];
        let op = Transform::from_name("FIND_AND_REPLACE", Some("foo"), Some("bar")).unwrap();
        assert_eq!(values(&run(op, &cells)), vec!["barbar", "Foo"]);
    }

    #[test]
    fn test_find_literal_treats_metacharacters_as_text() {
        let cells = vec![Cell::new(0, 0, "a.b axb")];
        let op = Transform::from_name("FIND_AND_REPLACE", Some("a.b"), Some("-")).unwrap();
        assert_eq!(values(&run(op, &cells)), vec!["- axb"]);
    }

    #[test]
    fn test_find_pattern_mode() {
        let options = EngineOptions {
            find_mode: FindMode::Pattern,
            ..EngineOptions::default()
        };
        let cells = vec![Cell::new(0, 0, "a.b axb 2024-01-05")];
        let op = Transform::from_name("FIND_AND_REPLACE", Some(r"(\d+)-(\d+)-(\d+)"), Some("$3/$2/$1"))
            .unwrap();
        let out = transform(&op, &cells, &options).unwrap();
        assert_eq!(out[0].value, "a.b axb 05/01/2024");
    }

    #[test]
    fn test_find_pattern_js_replacement_forms() {
        let options = EngineOptions {
            find_mode: FindMode::Pattern,
            ..EngineOptions::default()
        };
        let cells = vec![Cell::new(0, 0, "cat 7")];
        let replace_with = |find: &str, replace: &str| {
            let op = Transform::from_name("FIND_AND_REPLACE", Some(find), Some(replace)).unwrap();
            transform(&op, &cells, &options).unwrap()[0].value.clone()
        };
        assert_eq!(replace_with(r"(\d)", "$1a"), "cat 7a");
        assert_eq!(replace_with("cat", "[$&]"), "[cat] 7");
        assert_eq!(replace_with(r"(?<n>\d)", "#$<n>"), "cat #7");
        assert_eq!(replace_with(r"\d", "$$5"), "cat $5");
        assert_eq!(replace_with(r"\d", "$9"), "cat $9");
        assert_eq!(replace_with(r"\d", "$"), "cat $");
    }

    #[test]
    fn test_expand_js_replacement() {
        assert_eq!(expand_js_replacement("$1a", 2), "${1}a");
        assert_eq!(expand_js_replacement("$12", 13), "${12}");
        assert_eq!(expand_js_replacement("$12", 2), "${1}2");
        assert_eq!(expand_js_replacement("$0", 2), "$$0");
        assert_eq!(expand_js_replacement("$<x", 1), "$$<x");
        assert_eq!(expand_js_replacement("a$", 1), "a$$");
    }

    #[test]
    fn test_find_pattern_invalid() {
        let options = EngineOptions {
            find_mode: FindMode::Pattern,
            ..EngineOptions::default()
        };
        let op = Transform::from_name("FIND_AND_REPLACE", Some("(unclosed"), Some("x")).unwrap();
        let err = transform(&op, &[Cell::new(0, 0, "a")], &options).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPattern(_)));
    }

    #[test]
    fn test_find_missing_or_empty_is_noop() {
        let cells = vec![Cell::new(0, 0, "abc")];
        let op = Transform::from_name("FIND_AND_REPLACE", None, Some("x")).unwrap();
        assert_eq!(run(op, &cells), cells);
    }

    #[test]
    fn test_from_name_unknown() {
        assert!(Transform::from_name("REVERSE", None, None).is_none());
        assert!(Transform::from_name("trim", None, None).is_none());
        for name in Transform::NAMES {
            assert_eq!(Transform::from_name(name, None, None).unwrap().name(), name);
        }
    }
}

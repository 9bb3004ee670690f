//! End-to-end behavior of the sheet service over real stores.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use sheetgrid_core::store::StoreResult;
use sheetgrid_core::{
    CalculateRequest, Cell, CellId, CellStore, DataQualityRequest, DataType, JsonFileStore,
    MemoryStore, NewCell, Sheet, SheetError, Snapshot, StoreError,
};

fn calc(operation: &str, range: serde_json::Value) -> CalculateRequest {
    CalculateRequest {
        operation: operation.to_string(),
        range,
    }
}

fn seed<S: CellStore>(sheet: &Sheet<S>, cells: &[(usize, usize, &str)]) {
    for &(row, column, value) in cells {
        sheet.create_cell(NewCell::new(row, column, value)).unwrap();
    }
}

#[test]
fn dense_grid_fills_gaps() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "A"), (0, 1, "B"), (1, 0, "C")]);
    let grid = serde_json::to_value(sheet.dense().unwrap()).unwrap();
    assert_eq!(grid, json!([["A", "B"], ["C"]]));
}

#[test]
fn sum_with_garbage_text_is_deliberately_lenient() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "10"), (0, 1, "abc")]);
    let response = sheet.calculate(&calc("SUM", json!([[0, 0], [0, 1]]))).unwrap();
    assert_eq!(response.result, 10.0);
}

#[test]
fn count_counts_requested_coordinates() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "1")]);
    let response = sheet
        .calculate(&calc("COUNT", json!([[0, 0], [5, 5], [9, 9]])))
        .unwrap();
    assert_eq!(response.result, 3.0);
}

#[test]
fn empty_ranges_are_rejected_where_meaningless() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "1")]);
    for op in ["AVERAGE", "MAX", "MIN"] {
        assert!(matches!(
            sheet.calculate(&calc(op, json!([]))),
            Err(SheetError::InvalidRange(_))
        ));
    }
    assert_eq!(sheet.calculate(&calc("SUM", json!([]))).unwrap().result, 0.0);
}

#[test]
fn response_serializes_as_result_object() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "2"), (0, 1, "4")]);
    let response = sheet.calculate(&calc("AVERAGE", json!([[0, 0], [0, 1]]))).unwrap();
    assert_eq!(serde_json::to_value(response).unwrap(), json!({"result": 3.0}));
}

#[test]
fn remove_duplicates_keeps_first_occurrence() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "x"), (0, 0, "x"), (0, 1, "y")]);
    let out = sheet
        .data_quality(&DataQualityRequest::new("REMOVE_DUPLICATES"))
        .unwrap();
    let kept: Vec<_> = out.iter().map(|c| (c.row, c.column, c.value.as_str(), c.id)).collect();
    assert_eq!(kept, vec![(0, 0, "x", Some(1)), (0, 1, "y", Some(3))]);
    assert_eq!(sheet.cells().unwrap().len(), 2);
}

#[test]
fn find_and_replace_is_global_within_a_cell() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "foofoo")]);
    let out = sheet
        .data_quality(&DataQualityRequest::find_and_replace("foo", "bar"))
        .unwrap();
    assert_eq!(out[0].value, "barbar");
}

#[test]
fn upper_twice_equals_upper_once() {
    let sheet = Sheet::new(MemoryStore::new());
    seed(&sheet, &[(0, 0, "mixed Case"), (1, 1, "ünïcode")]);
    let once = sheet.data_quality(&DataQualityRequest::new("UPPER")).unwrap();
    let twice = sheet.data_quality(&DataQualityRequest::new("UPPER")).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn numeric_cells_reject_non_numeric_values() {
    let sheet = Sheet::new(MemoryStore::new());
    let err = sheet
        .create_cell(NewCell::new(0, 0, "ten").with_data_type(DataType::Number))
        .unwrap_err();
    assert!(matches!(err, SheetError::TypeMismatch { .. }));
}

#[test]
fn file_store_persists_across_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cells.json");

    let sheet = Sheet::new(JsonFileStore::new(&path));
    seed(&sheet, &[(0, 0, "  padded  "), (2, 1, "5")]);
    sheet.data_quality(&DataQualityRequest::new("TRIM")).unwrap();

    let reopened = Sheet::new(JsonFileStore::new(&path));
    let grid = reopened.dense().unwrap();
    assert_eq!(grid.get(0, 0), Some("padded"));
    assert_eq!(grid.get(2, 1), Some("5"));
}

#[test]
fn corrupt_file_surfaces_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cells.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let sheet = Sheet::new(JsonFileStore::new(&path));
    assert!(matches!(sheet.cells(), Err(SheetError::StoreUnavailable(_))));
    assert!(matches!(
        sheet.calculate(&calc("SUM", json!([[0, 0]]))),
        Err(SheetError::StoreUnavailable(_))
    ));
}

/// Store that lets another writer slip in between the first snapshot and the
/// bulk write.
struct RacingStore {
    inner: MemoryStore,
    raced: AtomicBool,
}

impl CellStore for RacingStore {
    fn snapshot(&self) -> StoreResult<Snapshot> {
        let snapshot = self.inner.snapshot()?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.append(Cell::new(9, 9, "concurrent"))?;
        }
        Ok(snapshot)
    }

    fn append(&self, cell: Cell) -> StoreResult<Cell> {
        self.inner.append(cell)
    }

    fn replace_all(&self, cells: Vec<Cell>, expected_version: Option<u64>) -> StoreResult<u64> {
        self.inner.replace_all(cells, expected_version)
    }

    fn update_by_id(&self, id: CellId, value: &str) -> StoreResult<Cell> {
        self.inner.update_by_id(id, value)
    }
}

#[test]
fn concurrent_write_during_transform_is_a_conflict() {
    let inner = MemoryStore::with_cells(vec![Cell::new(0, 0, " a ")]);
    let sheet = Sheet::new(RacingStore {
        inner,
        raced: AtomicBool::new(false),
    });

    let err = sheet.data_quality(&DataQualityRequest::new("TRIM")).unwrap_err();
    assert!(matches!(err, SheetError::Conflict { .. }));

    // The concurrent write survived and nothing was trimmed.
    let cells = sheet.cells().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].value, " a ");

    // Retrying against the new version succeeds.
    let out = sheet.data_quality(&DataQualityRequest::new("TRIM")).unwrap();
    assert_eq!(out[0].value, "a");
}

#[test]
fn store_errors_are_not_data_errors() {
    struct DownStore;
    impl CellStore for DownStore {
        fn snapshot(&self) -> StoreResult<Snapshot> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        fn append(&self, _cell: Cell) -> StoreResult<Cell> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        fn replace_all(&self, _cells: Vec<Cell>, _expected: Option<u64>) -> StoreResult<u64> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        fn update_by_id(&self, _id: CellId, _value: &str) -> StoreResult<Cell> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    let sheet = Sheet::new(DownStore);
    assert!(matches!(sheet.dense(), Err(SheetError::StoreUnavailable(_))));
    assert!(matches!(
        sheet.data_quality(&DataQualityRequest::new("TRIM")),
        Err(SheetError::StoreUnavailable(_))
    ));
    assert!(matches!(
        sheet.create_cell(NewCell::new(0, 0, "x")),
        Err(SheetError::StoreUnavailable(_))
    ));
}

//! On-disk round-trip tests for table documents.

use proptest::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use trellis_storage::{load_table, row_storage_folder, save_as_csv, save_table};
use trellis_test_utils::{
    arb_table, row_with_artifact, table_of, test_registry, DataAnnotation, DataTypeId,
};

#[test]
fn test_round_trip_preserves_rows_and_annotations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.json");

    let mut table = table_of(&[&[("Sample", "A"), ("Slice", "1")], &[("Sample", "B")]]);
    table.set_data_annotation(
        0,
        DataAnnotation::new(
            "Mask",
            row_storage_folder(0, "Mask"),
            DataTypeId::new("mask"),
        ),
    );

    save_table(&table, &path).unwrap();
    let restored = load_table(&path, &test_registry()).unwrap();

    assert_eq!(restored.row_count(), table.row_count());
    assert_eq!(restored.accepted_type(), table.accepted_type());
    for (original, loaded) in table.rows().iter().zip(restored.rows()) {
        assert_eq!(original.index, loaded.index);
        assert_eq!(original.context, loaded.context);
        assert_eq!(original.text_annotations(), loaded.text_annotations());
        for annotation in original.data_annotations() {
            let loaded_annotation = loaded.data_annotation(&annotation.name).unwrap();
            assert_eq!(loaded_annotation.storage_folder, annotation.storage_folder);
            assert_eq!(loaded_annotation.owner, Some(loaded.index));
        }
    }
}

#[test]
fn test_round_trip_row_with_artifact_fixture() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.json");

    let mut table = trellis_test_utils::DataTable::new(DataTypeId::new("imagej-imgplus"));
    table.push_row(row_with_artifact(0, "Mask"));
    table.push_row(row_with_artifact(1, "Mask"));

    save_table(&table, &path).unwrap();
    let restored = load_table(&path, &test_registry()).unwrap();
    assert_eq!(restored.data_annotation_columns(), vec!["Mask"]);
}

#[test]
fn test_load_reports_missing_file_path() {
    let err = load_table(Path::new("/nonexistent/table.json"), &test_registry()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/nonexistent/table.json"));
}

#[test]
fn test_legacy_alias_file_loads_identically() {
    let dir = TempDir::new().unwrap();
    let canonical = dir.path().join("canonical.json");
    let legacy = dir.path().join("legacy.json");

    let body = |field: &str| {
        format!(
            r#"{{
                "trellis:data-table-format-version": 1,
                "data-type": "imagej-imgplus",
                "rows": [{{"index": 0, "true-data-type": "imagej-imgplus",
                           "data-context": {{"id": "s"}},
                           "{field}": [{{"name": "Sample", "value": "A"}}]}}]
            }}"#
        )
    };
    std::fs::write(&canonical, body("text-annotations")).unwrap();
    std::fs::write(&legacy, body("traits")).unwrap();

    let registry = test_registry();
    let from_canonical = load_table(&canonical, &registry).unwrap();
    let from_legacy = load_table(&legacy, &registry).unwrap();
    assert_eq!(from_canonical.rows(), from_legacy.rows());
}

#[test]
fn test_csv_export_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.csv");
    let table = table_of(&[&[("Sample", "A")], &[]]);
    save_as_csv(&table, &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("trellis:data-type,"));
    assert_eq!(csv.lines().count(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_round_trip_is_lossless(table in arb_table(8)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");
        save_table(&table, &path).unwrap();
        let restored = load_table(&path, &test_registry()).unwrap();
        prop_assert_eq!(restored.rows(), table.rows());
        prop_assert_eq!(restored.text_annotation_columns(), table.text_annotation_columns());
        prop_assert_eq!(restored.data_annotation_columns(), table.data_annotation_columns());
    }
}

//! Trellis Test Utilities
//!
//! Centralized test infrastructure for the Trellis workspace:
//! - Proptest generators for annotations, rows and tables
//! - Deterministic fixtures for common slot layouts
//! - A pre-populated data-type registry

// Re-export core types for convenience
pub use trellis_core::{
    DataAnnotation, DataContext, DataTypeId, DataTypeInfo, DataTypeRegistry, TableRow,
    TextAnnotation,
};
pub use trellis_table::DataTable;

use proptest::prelude::*;

/// Type ids every fixture and generator draws from.
pub const TEST_TYPE_IDS: [&str; 3] = ["imagej-imgplus", "mask", "roi-list"];

/// A registry containing every test type id.
pub fn test_registry() -> DataTypeRegistry {
    let mut registry = DataTypeRegistry::new();
    registry.register(DataTypeInfo::new("imagej-imgplus", "Image"));
    registry.register(DataTypeInfo::new("mask", "Binary mask"));
    registry.register(DataTypeInfo::new("roi-list", "ROI list"));
    registry
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Builds a table of `imagej-imgplus` rows, one per annotation set.
pub fn table_of(rows: &[&[(&str, &str)]]) -> DataTable {
    let mut table = DataTable::new(DataTypeId::new("imagej-imgplus"));
    for annotations in rows {
        let mut row = TableRow::new(
            0,
            DataTypeId::new("imagej-imgplus"),
            DataContext::new("fixture"),
        );
        for (name, value) in *annotations {
            row.set_text_annotation(TextAnnotation::new(*name, *value));
        }
        table.push_row(row);
    }
    table
}

/// A row carrying one data annotation stored at the conventional layout.
pub fn row_with_artifact(index: usize, annotation: &str) -> TableRow {
    let mut row = TableRow::new(
        index,
        DataTypeId::new("imagej-imgplus"),
        DataContext::new("fixture"),
    );
    row.set_data_annotation(DataAnnotation::new(
        annotation,
        format!("data-annotations/{index}/{annotation}"),
        DataTypeId::new("mask"),
    ));
    row
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Annotation names: short, drawn from a small alphabet so collisions
/// between rows are common (which is what schema derivation and batching
/// care about).
pub fn arb_annotation_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Sample".to_string()),
        Just("Slice".to_string()),
        Just("Channel".to_string()),
        Just("Treatment".to_string()),
        "[A-Z][a-z]{1,6}".prop_map(|s| s),
    ]
}

pub fn arb_annotation_value() -> impl Strategy<Value = String> {
    "[a-z0-9]{0,8}".prop_map(|s| s)
}

pub fn arb_text_annotation() -> impl Strategy<Value = TextAnnotation> {
    (arb_annotation_name(), arb_annotation_value())
        .prop_map(|(name, value)| TextAnnotation::new(name, value))
}

pub fn arb_type_id() -> impl Strategy<Value = DataTypeId> {
    prop::sample::select(TEST_TYPE_IDS.as_slice()).prop_map(DataTypeId::new)
}

pub fn arb_data_annotation() -> impl Strategy<Value = DataAnnotation> {
    (arb_annotation_name(), 0usize..64, arb_type_id()).prop_map(|(name, row, true_type)| {
        let folder = format!("data-annotations/{row}/{name}");
        DataAnnotation::new(name, folder, true_type)
    })
}

/// A detached row with up to 4 text and 2 data annotations. Duplicate
/// names collapse through the replace-or-insert contract.
pub fn arb_row() -> impl Strategy<Value = TableRow> {
    (
        arb_type_id(),
        prop::collection::vec(arb_text_annotation(), 0..4),
        prop::collection::vec(arb_data_annotation(), 0..2),
    )
        .prop_map(|(true_type, text, data)| {
            let mut row = TableRow::new(0, true_type, DataContext::new("prop"));
            for annotation in text {
                row.set_text_annotation(annotation);
            }
            for annotation in data {
                row.set_data_annotation(annotation);
            }
            row
        })
}

/// A table of up to `max_rows` arbitrary rows.
pub fn arb_table(max_rows: usize) -> impl Strategy<Value = DataTable> {
    prop::collection::vec(arb_row(), 0..=max_rows).prop_map(|rows| {
        let mut table = DataTable::new(DataTypeId::new("imagej-imgplus"));
        table.extend_rows(rows);
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_table_shape() {
        let table = table_of(&[&[("Sample", "A")], &[]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.text_annotation_columns(), vec!["Sample"]);
    }

    proptest! {
        #[test]
        fn prop_generated_rows_have_unique_annotation_names(row in arb_row()) {
            let mut names: Vec<&str> =
                row.text_annotations().iter().map(|a| a.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), row.text_annotations().len());
        }

        #[test]
        fn prop_generated_tables_have_dense_indices(table in arb_table(8)) {
            for (i, row) in table.rows().iter().enumerate() {
                prop_assert_eq!(row.index, i);
            }
        }
    }
}

//! Property-Based Tests for Lazy Schema Derivation
//!
//! Property: after any sequence of row and annotation mutations, the cached
//! annotation-name columns SHALL equal a fresh recomputation over the
//! current row list.
//!
//! This validates:
//! - Every mutating operation invalidates the cache before returning
//! - Lazy recomputation observes the current rows, never stale ones
//! - First-seen column order is stable under interleaved mutation

use proptest::prelude::*;
use trellis_core::{DataContext, DataTypeId, TableRow, TextAnnotation};
use trellis_table::DataTable;

/// One mutating table operation.
#[derive(Debug, Clone)]
enum Mutation {
    Push(Vec<(String, String)>),
    Remove(usize),
    SetAnnotation(usize, String, String),
    RemoveAnnotation(usize, String),
    Clear,
}

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Sample".to_string(),
        "Slice".to_string(),
        "Channel".to_string(),
        "Treatment".to_string(),
        "Replicate".to_string(),
    ])
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        4 => prop::collection::vec((arb_name(), "[a-z]{0,4}"), 0..3).prop_map(Mutation::Push),
        2 => (0usize..8).prop_map(Mutation::Remove),
        3 => (0usize..8, arb_name(), "[a-z]{0,4}".prop_map(String::from))
            .prop_map(|(row, name, value)| Mutation::SetAnnotation(row, name, value)),
        2 => (0usize..8, arb_name()).prop_map(|(row, name)| Mutation::RemoveAnnotation(row, name)),
        1 => Just(Mutation::Clear),
    ]
}

fn apply(table: &mut DataTable, mutation: &Mutation) {
    match mutation {
        Mutation::Push(annotations) => {
            let mut row = TableRow::new(0, DataTypeId::new("t"), DataContext::new("prop"));
            for (name, value) in annotations {
                row.set_text_annotation(TextAnnotation::new(name.clone(), value.clone()));
            }
            table.push_row(row);
        }
        Mutation::Remove(index) => {
            table.remove_row(*index);
        }
        Mutation::SetAnnotation(index, name, value) => {
            table.set_text_annotation(*index, TextAnnotation::new(name.clone(), value.clone()));
        }
        Mutation::RemoveAnnotation(index, name) => {
            table.remove_text_annotation(*index, name);
        }
        Mutation::Clear => table.clear(),
    }
}

/// Fresh first-seen-order recomputation, independent of the cache.
fn recompute_columns(table: &DataTable) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in table.rows() {
        for annotation in row.text_annotations() {
            if !columns.iter().any(|c| c == &annotation.name) {
                columns.push(annotation.name.clone());
            }
        }
    }
    columns
}

proptest! {
    #[test]
    fn prop_schema_never_goes_stale(mutations in prop::collection::vec(arb_mutation(), 0..32)) {
        let mut table = DataTable::new(DataTypeId::new("t"));
        for mutation in &mutations {
            apply(&mut table, mutation);
            prop_assert_eq!(table.text_annotation_columns(), recompute_columns(&table));
            prop_assert!(table.verify_schema_cache().is_ok());
        }
    }

    #[test]
    fn prop_reads_between_mutations_do_not_pin_the_cache(
        mutations in prop::collection::vec(arb_mutation(), 1..16),
        read_every in 1usize..4,
    ) {
        let mut table = DataTable::new(DataTypeId::new("t"));
        for (i, mutation) in mutations.iter().enumerate() {
            apply(&mut table, mutation);
            // Interleave reads so the cache is populated mid-sequence.
            if i % read_every == 0 {
                let _ = table.text_annotation_columns();
                let _ = table.data_annotation_columns();
            }
        }
        prop_assert_eq!(table.text_annotation_columns(), recompute_columns(&table));
    }
}

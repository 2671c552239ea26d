//! Read-only union of tables from multiple stages/branches.

use crate::DataTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trellis_core::{RowIndex, TableRow};

/// Where one merged row came from: which branch, stage and slot produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowProvenance {
    pub branch: String,
    pub stage: String,
    pub slot: String,
}

/// Reference to a row of a contributing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergedRowRef {
    table: usize,
    row: RowIndex,
}

/// Append-only union of published tables, used for cross-run inspection
/// and export.
///
/// Rows are referenced, not copied: the merged table keeps the contributing
/// tables alive through `Arc` and resolves rows on access, so row identity
/// survives the merge. The merged schema unions are extended eagerly on
/// every `add` - since nothing is ever removed, no invalidation exists.
///
/// Single-writer: `add` takes `&mut self`; two concurrent `add` calls on
/// one instance are rejected by the borrow checker rather than a lock.
#[derive(Debug, Clone, Default)]
pub struct MergedTable {
    sources: Vec<Arc<DataTable>>,
    rows: Vec<MergedRowRef>,
    provenance: Vec<RowProvenance>,
    text_columns: Vec<String>,
    data_columns: Vec<String>,
    created_at: Option<DateTime<Utc>>,
}

impl MergedTable {
    pub fn new() -> Self {
        Self {
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Appends every row of `table`, recording one provenance triple per
    /// appended row, and extends the merged schema unions.
    pub fn add(
        &mut self,
        branch: impl Into<String>,
        stage: impl Into<String>,
        slot: impl Into<String>,
        table: Arc<DataTable>,
    ) {
        let provenance = RowProvenance {
            branch: branch.into(),
            stage: stage.into(),
            slot: slot.into(),
        };
        for column in table.text_annotation_columns() {
            if !self.text_columns.contains(&column) {
                self.text_columns.push(column);
            }
        }
        for column in table.data_annotation_columns() {
            if !self.data_columns.contains(&column) {
                self.data_columns.push(column);
            }
        }
        let table_index = self.sources.len();
        for row in 0..table.row_count() {
            self.rows.push(MergedRowRef {
                table: table_index,
                row,
            });
            self.provenance.push(provenance.clone());
        }
        self.sources.push(table);
    }

    /// Resolves one merged row into its provenance triple and the row it
    /// references.
    pub fn get(&self, row: usize) -> Option<(&RowProvenance, &TableRow)> {
        let row_ref = self.rows.get(row)?;
        let table_row = self.sources[row_ref.table].row(row_ref.row)?;
        Some((&self.provenance[row], table_row))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The contributing tables, in the order they were added.
    pub fn source_tables(&self) -> &[Arc<DataTable>] {
        &self.sources
    }

    /// Merge-level union of text-annotation column names.
    pub fn text_annotation_columns(&self) -> &[String] {
        &self.text_columns
    }

    /// Merge-level union of data-annotation column names.
    pub fn data_annotation_columns(&self) -> &[String] {
        &self.data_columns
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

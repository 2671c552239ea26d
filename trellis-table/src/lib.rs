//! Trellis Table - Annotated Data Tables
//!
//! `DataTable` is the ordered sequence of annotated rows held by one slot,
//! with lazily derived annotation-name schemas. `MergedTable` is the
//! read-only cross-run union with per-row provenance. The read-only tabular
//! view consumed by presentation layers lives in [`view`].

pub mod merged;
pub mod view;

pub use merged::{MergedTable, RowProvenance};
pub use view::{CellValue, ColumnKind, TableModel};

use std::sync::RwLock;
use trellis_core::{
    DataAnnotation, DataTypeId, RowIndex, SchemaError, TableRow, TextAnnotation,
};

/// Lazily derived annotation-name schema of a table.
///
/// A single explicit dirty flag guards both column lists. Every mutating
/// table operation marks the cache dirty before returning; the next read
/// recomputes. The flag is deliberately the only staleness mechanism - no
/// per-field nullable caches.
#[derive(Debug, Default)]
struct SchemaCache {
    dirty: bool,
    text_columns: Vec<String>,
    data_columns: Vec<String>,
}

/// An ordered sequence of annotated rows plus the data type accepted by the
/// owning slot.
///
/// Lifecycle: created empty by a stage or by deserialization, populated
/// incrementally, then published to the batching engine or serializer.
/// Publication makes the table read-only by contract; nothing enforces it
/// with a lock, but no component may mutate a published table.
#[derive(Debug)]
pub struct DataTable {
    accepted_type: DataTypeId,
    rows: Vec<TableRow>,
    schema: RwLock<SchemaCache>,
}

impl DataTable {
    pub fn new(accepted_type: DataTypeId) -> Self {
        Self {
            accepted_type,
            rows: Vec::new(),
            schema: RwLock::new(SchemaCache::default()),
        }
    }

    pub fn accepted_type(&self) -> &DataTypeId {
        &self.accepted_type
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, index: RowIndex) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // -------------------------------------------------------------------------
    // Mutation. Every operation below invalidates the schema cache before
    // returning.
    // -------------------------------------------------------------------------

    /// Appends a row, assigning it the next stable index.
    pub fn push_row(&mut self, mut row: TableRow) -> RowIndex {
        let index = self.rows.len();
        row.index = index;
        row.relink_data_annotations();
        self.rows.push(row);
        self.invalidate_schema();
        index
    }

    /// Bulk-appends rows in order.
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = TableRow>) {
        for row in rows {
            let index = self.rows.len();
            let mut row = row;
            row.index = index;
            row.relink_data_annotations();
            self.rows.push(row);
        }
        self.invalidate_schema();
    }

    /// Removes the row at `index`; subsequent rows are re-indexed so row
    /// indices stay dense and stable.
    pub fn remove_row(&mut self, index: RowIndex) -> Option<TableRow> {
        if index >= self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(index);
        for row in &mut self.rows[index..] {
            row.index -= 1;
            row.relink_data_annotations();
        }
        self.invalidate_schema();
        Some(removed)
    }

    /// Replaces the row at `index`, keeping the index stable. Returns the
    /// previous row, or `None` (and leaves the table untouched) when out of
    /// bounds.
    pub fn replace_row(&mut self, index: RowIndex, mut row: TableRow) -> Option<TableRow> {
        let slot = self.rows.get_mut(index)?;
        row.index = index;
        row.relink_data_annotations();
        let previous = std::mem::replace(slot, row);
        self.invalidate_schema();
        Some(previous)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.invalidate_schema();
    }

    /// Replace-or-inserts a text annotation on one row. Returns `false`
    /// when the row does not exist.
    pub fn set_text_annotation(&mut self, index: RowIndex, annotation: TextAnnotation) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        row.set_text_annotation(annotation);
        self.invalidate_schema();
        true
    }

    /// Replace-or-inserts a data annotation on one row. Returns `false`
    /// when the row does not exist.
    pub fn set_data_annotation(&mut self, index: RowIndex, annotation: DataAnnotation) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        row.set_data_annotation(annotation);
        self.invalidate_schema();
        true
    }

    pub fn remove_text_annotation(
        &mut self,
        index: RowIndex,
        name: &str,
    ) -> Option<TextAnnotation> {
        let removed = self.rows.get_mut(index)?.remove_text_annotation(name);
        if removed.is_some() {
            self.invalidate_schema();
        }
        removed
    }

    pub fn remove_data_annotation(
        &mut self,
        index: RowIndex,
        name: &str,
    ) -> Option<DataAnnotation> {
        let removed = self.rows.get_mut(index)?.remove_data_annotation(name);
        if removed.is_some() {
            self.invalidate_schema();
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Schema derivation
    // -------------------------------------------------------------------------

    /// First-seen-order union of text-annotation names across all rows.
    pub fn text_annotation_columns(&self) -> Vec<String> {
        self.refresh_schema();
        self.schema
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .text_columns
            .clone()
    }

    /// First-seen-order union of data-annotation names across all rows.
    pub fn data_annotation_columns(&self) -> Vec<String> {
        self.refresh_schema();
        self.schema
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .data_columns
            .clone()
    }

    /// Cross-checks the cached schema against a fresh recomputation.
    ///
    /// A mismatch means a mutating operation skipped invalidation - a
    /// programming defect, surfaced as [`SchemaError::StaleCache`] so
    /// callers can fail fast. Used by debug assertions and tests.
    pub fn verify_schema_cache(&self) -> Result<(), SchemaError> {
        let guard = self
            .schema
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.dirty {
            return Ok(());
        }
        let (text, data) = self.compute_schema();
        if guard.text_columns != text {
            return Err(SchemaError::StaleCache {
                kind: "text-annotation".to_string(),
                cached: guard.text_columns.clone(),
                actual: text,
            });
        }
        if guard.data_columns != data {
            return Err(SchemaError::StaleCache {
                kind: "data-annotation".to_string(),
                cached: guard.data_columns.clone(),
                actual: data,
            });
        }
        Ok(())
    }

    fn invalidate_schema(&mut self) {
        self.schema
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .dirty = true;
    }

    fn refresh_schema(&self) {
        {
            let guard = self
                .schema
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !guard.dirty {
                return;
            }
        }
        let (text_columns, data_columns) = self.compute_schema();
        let mut guard = self
            .schema
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.text_columns = text_columns;
        guard.data_columns = data_columns;
        guard.dirty = false;
    }

    fn compute_schema(&self) -> (Vec<String>, Vec<String>) {
        let mut text_columns: Vec<String> = Vec::new();
        let mut data_columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for annotation in row.text_annotations() {
                if !text_columns.iter().any(|c| c == &annotation.name) {
                    text_columns.push(annotation.name.clone());
                }
            }
            for annotation in row.data_annotations() {
                if !data_columns.iter().any(|c| c == &annotation.name) {
                    data_columns.push(annotation.name.clone());
                }
            }
        }
        (text_columns, data_columns)
    }
}

impl Clone for DataTable {
    fn clone(&self) -> Self {
        // The clone starts with a dirty cache and recomputes on first read.
        Self {
            accepted_type: self.accepted_type.clone(),
            rows: self.rows.clone(),
            schema: RwLock::new(SchemaCache {
                dirty: true,
                ..SchemaCache::default()
            }),
        }
    }
}

//! The versioned JSON table document.
//!
//! Loading is two-pass: the whole row list is materialized first, then a
//! linking pass re-points every data annotation at its owning row. The
//! back-reference cannot be resolved during element-wise decoding because
//! the owning row does not exist yet at that point.
//!
//! Two legacy field names for `text-annotations` (`annotations` and
//! `traits`, both historical renames) are accepted on read and mapped onto
//! the canonical field.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;
use trellis_core::{
    DataAnnotation, DataContext, DataTypeId, DataTypeRegistry, StorageError, TableRow,
    TextAnnotation,
};
use trellis_table::DataTable;

/// Format version written to every document. Version checks on read keep
/// room for backward-compatible evolution.
pub const FORMAT_VERSION: i32 = 1;

/// Serialized form of one table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowDocument {
    pub index: usize,
    #[serde(rename = "true-data-type")]
    pub true_data_type: DataTypeId,
    #[serde(rename = "data-context", default)]
    pub data_context: DataContext,
    #[serde(
        rename = "text-annotations",
        alias = "annotations",
        alias = "traits",
        default
    )]
    pub text_annotations: Vec<TextAnnotation>,
    #[serde(rename = "data-annotations", default)]
    pub data_annotations: Vec<DataAnnotation>,
}

/// Top-level table document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDocument {
    #[serde(rename = "trellis:data-table-format-version")]
    pub format_version: i32,
    #[serde(rename = "data-type")]
    pub data_type: DataTypeId,
    pub rows: Vec<RowDocument>,
}

impl TableDocument {
    pub fn from_table(table: &DataTable) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            data_type: table.accepted_type().clone(),
            rows: table
                .rows()
                .iter()
                .map(|row| RowDocument {
                    index: row.index,
                    true_data_type: row.true_type.clone(),
                    data_context: row.context.clone(),
                    text_annotations: row.text_annotations().to_vec(),
                    data_annotations: row.data_annotations().to_vec(),
                })
                .collect(),
        }
    }

    /// Validates the document against `registry` and materializes the
    /// table. `path` only labels errors.
    pub fn into_table(
        self,
        path: &Path,
        registry: &DataTypeRegistry,
    ) -> Result<DataTable, StorageError> {
        if self.format_version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormatVersion {
                path: path.to_path_buf(),
                version: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let resolve = |id: &DataTypeId| -> Result<(), StorageError> {
            if registry.contains(id) {
                Ok(())
            } else {
                Err(StorageError::UnknownDataType {
                    path: path.to_path_buf(),
                    id: id.to_string(),
                })
            }
        };
        resolve(&self.data_type)?;

        // Pass 1: decode and validate every row.
        let mut rows = Vec::with_capacity(self.rows.len());
        for document in self.rows {
            resolve(&document.true_data_type)?;
            let mut row = TableRow::new(
                document.index,
                document.true_data_type,
                document.data_context,
            );
            for annotation in document.text_annotations {
                row.set_text_annotation(annotation);
            }
            for annotation in document.data_annotations {
                resolve(&annotation.true_type)?;
                if annotation.storage_folder.is_absolute() {
                    return Err(StorageError::AbsoluteStoragePath {
                        row: document.index,
                        annotation: annotation.name.clone(),
                        path: annotation.storage_folder.clone(),
                    });
                }
                row.set_data_annotation(annotation);
            }
            rows.push(row);
        }

        // Pass 2: append in document order; the table assigns dense indices
        // and re-links every data annotation to its owning row.
        let mut table = DataTable::new(self.data_type);
        table.extend_rows(rows);
        Ok(table)
    }
}

/// Writes a table to a versioned JSON document. Aborts entirely on error;
/// a partially written document is never left behind silently.
pub fn save_table(table: &DataTable, path: &Path) -> Result<(), StorageError> {
    let document = TableDocument::from_table(table);
    let file = File::create(path).map_err(|e| StorageError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document).map_err(|e| {
        StorageError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    debug!(path = %path.display(), rows = document.rows.len(), "saved table document");
    Ok(())
}

/// Reads a versioned JSON document into a table, resolving every type id
/// against `registry`. Aborts entirely on error; no partial table is ever
/// returned.
pub fn load_table(path: &Path, registry: &DataTypeRegistry) -> Result<DataTable, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let document: TableDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            StorageError::MalformedDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
    let table = document.into_table(path, registry)?;
    debug!(path = %path.display(), rows = table.row_count(), "loaded table document");
    Ok(table)
}

/// Convenience wrapper over [`load_table`] using the process-wide default
/// registry.
pub fn load_table_global(path: &Path) -> Result<DataTable, StorageError> {
    let registry = DataTypeRegistry::global()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    load_table(path, &registry)
}

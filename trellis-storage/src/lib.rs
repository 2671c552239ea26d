//! Trellis Storage - Table Documents
//!
//! Persists tables as versioned JSON documents and flattens them to CSV.
//! Documents never contain absolute paths: every data-annotation payload
//! location is relative to the table's storage root, so a saved table can
//! be relocated wholesale.
//!
//! The loader takes a [`DataTypeRegistry`] explicitly and resolves every
//! type id exactly once, at load time.

pub mod csv;
pub mod document;

pub use csv::{save_as_csv, to_csv_string};
pub use document::{load_table, load_table_global, save_table, RowDocument, TableDocument};

use std::path::{Path, PathBuf};
use trellis_core::RowIndex;

/// Name of the directory under a table root that holds row payloads.
pub const DATA_ANNOTATIONS_DIR: &str = "data-annotations";

/// The relative storage folder of one data annotation:
/// `data-annotations/<row-index>/<annotation-name>`.
pub fn row_storage_folder(row: RowIndex, annotation: &str) -> PathBuf {
    PathBuf::from(DATA_ANNOTATIONS_DIR)
        .join(row.to_string())
        .join(annotation)
}

/// Resolves a row's payload folder against a table storage root.
pub fn resolve_row_storage(table_root: &Path, row: RowIndex, annotation: &str) -> PathBuf {
    table_root.join(row_storage_folder(row, annotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_storage_layout() {
        assert_eq!(
            row_storage_folder(4, "Mask"),
            PathBuf::from("data-annotations/4/Mask")
        );
        assert_eq!(
            resolve_row_storage(Path::new("/runs/7/Output"), 0, "Mask"),
            PathBuf::from("/runs/7/Output/data-annotations/0/Mask")
        );
    }
}

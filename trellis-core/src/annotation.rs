//! Text and data annotations attached to table rows.
//!
//! Both kinds are compared and looked up by name, never by identity. Within
//! one row, annotation names are unique; replace-or-insert by name is the
//! only write path (see [`crate::row::TableRow`]).

use crate::registry::DataTypeId;
use crate::RowIndex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An immutable key/value text label attached to a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub name: String,
    pub value: String,
}

impl TextAnnotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The only equality test used for annotation lookup.
    pub fn name_equals(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A named pointer to an auxiliary stored artifact attached to a row.
///
/// `storage_folder` is always relative to the owning table's storage root,
/// which keeps the on-disk representation relocatable. The owner row index
/// is not part of the serialized form; it is re-linked after a table is
/// fully materialized (see the storage crate's two-pass load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAnnotation {
    pub name: String,
    #[serde(rename = "row-storage-folder")]
    pub storage_folder: PathBuf,
    #[serde(rename = "true-data-type")]
    pub true_type: DataTypeId,
    /// Index of the owning row within its table. `None` while detached
    /// (during element-wise decoding, before the linking pass).
    #[serde(skip)]
    pub owner: Option<RowIndex>,
}

impl DataAnnotation {
    pub fn new(
        name: impl Into<String>,
        storage_folder: impl Into<PathBuf>,
        true_type: DataTypeId,
    ) -> Self {
        Self {
            name: name.into(),
            storage_folder: storage_folder.into(),
            true_type,
            owner: None,
        }
    }

    /// The only equality test used for annotation lookup.
    pub fn name_equals(&self, name: &str) -> bool {
        self.name == name
    }

    /// Resolves the payload location against a table storage root.
    pub fn resolve_storage(&self, table_root: &Path) -> PathBuf {
        table_root.join(&self.storage_folder)
    }
}

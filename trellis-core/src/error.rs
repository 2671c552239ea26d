//! Error types for Trellis operations.

use std::path::PathBuf;
use thiserror::Error;

/// Batching (join) engine errors.
///
/// Always surfaced to the invoking stage/executor with the offending
/// grouping tuple and slot names, never dropped silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchingError {
    #[error("No row in slot '{slot}' matches grouping tuple {key}")]
    UnmatchedSlot { slot: String, key: String },

    #[error("Slot '{slot}' has {} rows matching grouping tuple {key}: {rows:?}", rows.len())]
    AmbiguousMatch {
        slot: String,
        key: String,
        rows: Vec<usize>,
    },
}

/// Internal schema-cache invariant breaches.
///
/// These indicate a missed invalidation, a programming defect. They fail
/// fast instead of being caught and retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Stale schema cache for column kind '{kind}': cached {cached:?}, actual {actual:?}")]
    StaleCache {
        kind: String,
        cached: Vec<String>,
        actual: Vec<String>,
    },
}

/// Table document (de)serialization errors.
///
/// A failed load or save aborts the whole call; no partial table is ever
/// returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Unable to read table document '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Unable to write table document '{path}': {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Malformed table document '{path}': {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Table document '{path}' uses unsupported format version {version} (expected {expected})")]
    UnsupportedFormatVersion {
        path: PathBuf,
        version: i32,
        expected: i32,
    },

    #[error("Unknown data type id '{id}' in table document '{path}'")]
    UnknownDataType { path: PathBuf, id: String },

    #[error("Data annotation '{annotation}' in row {row} stores an absolute path '{path}'; storage paths must be relative to the table root")]
    AbsoluteStoragePath {
        row: usize,
        annotation: String,
        path: PathBuf,
    },
}

/// Annotation merge conflicts under a policy that forbids silent overwrite.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Annotation '{name}' collides during merge: existing value '{existing}', incoming value '{incoming}'")]
    Conflict {
        name: String,
        existing: String,
        incoming: String,
    },
}

/// Master error type for all Trellis errors.
#[derive(Debug, Clone, Error)]
pub enum TrellisError {
    #[error("Batching error: {0}")]
    Batching(#[from] BatchingError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),
}

/// Result type alias for Trellis operations.
pub type TrellisResult<T> = Result<T, TrellisError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_match_display_names_tuple_and_rows() {
        let err = BatchingError::AmbiguousMatch {
            slot: "Input 1".to_string(),
            key: "{Sample=A}".to_string(),
            rows: vec![1, 4],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Input 1"));
        assert!(msg.contains("{Sample=A}"));
        assert!(msg.contains("[1, 4]"));
    }

    #[test]
    fn test_load_failure_reports_path_and_cause() {
        let err = StorageError::ReadFailed {
            path: PathBuf::from("/data/table.json"),
            reason: "permission denied".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/data/table.json"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_master_error_conversions() {
        let batching = TrellisError::from(BatchingError::UnmatchedSlot {
            slot: "Input 1".to_string(),
            key: "{}".to_string(),
        });
        assert!(matches!(batching, TrellisError::Batching(_)));

        let merge = TrellisError::from(MergeError::Conflict {
            name: "Sample".to_string(),
            existing: "A".to_string(),
            incoming: "B".to_string(),
        });
        assert!(matches!(merge, TrellisError::Merge(_)));

        let storage = TrellisError::from(StorageError::UnknownDataType {
            path: PathBuf::from("t.json"),
            id: "bogus".to_string(),
        });
        assert!(matches!(storage, TrellisError::Storage(_)));
    }
}

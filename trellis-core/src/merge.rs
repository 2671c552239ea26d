//! Annotation merge modes.
//!
//! These are pure policy enums; the application logic lives in the batch
//! crate, next to the output-write path that consults them. Both kinds of
//! annotation use the same name-equality contract for collision detection.

use serde::{Deserialize, Serialize};

/// Policy applied when merged text annotations are written to an output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAnnotationMergeMode {
    /// Union; on a name collision the existing value is kept and the
    /// discarded incoming value is logged.
    #[default]
    Merge,
    /// Union; on a name collision the incoming value wins.
    OverwriteExisting,
    /// Incoming annotations whose name already exists are dropped silently.
    SkipExisting,
    /// A name collision with a differing value is an error.
    Fail,
}

/// Policy applied when merged data annotations are written to an output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataAnnotationMergeMode {
    /// Union; on a name collision the existing annotation is kept.
    #[default]
    Merge,
    /// Union; on a name collision the incoming annotation wins.
    OverwriteExisting,
    /// Incoming annotations whose name already exists are dropped silently.
    SkipExisting,
    /// A name collision pointing at a different storage folder is an error.
    Fail,
}

//! Trellis Core - Annotated-Table Data Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains the row/annotation data model, the data-type registry,
//! merge-mode enums and the error taxonomy - no batching or storage logic.

pub mod annotation;
pub mod context;
pub mod error;
pub mod merge;
pub mod registry;
pub mod row;

pub use annotation::{DataAnnotation, TextAnnotation};
pub use context::DataContext;
pub use error::{
    BatchingError, MergeError, SchemaError, StorageError, TrellisError, TrellisResult,
};
pub use merge::{DataAnnotationMergeMode, TextAnnotationMergeMode};
pub use registry::{DataTypeId, DataTypeInfo, DataTypeRegistry};
pub use row::TableRow;

/// Name of an input/output channel of a pipeline stage.
pub type SlotName = String;

/// 0-based row index, stable within one table.
pub type RowIndex = usize;

//! Trellis Batch - Annotation-Driven Batching Engine
//!
//! Groups the input tables of a pipeline stage into batches: one execution
//! unit pairing at most one row per slot, selected by matching annotation
//! values - a multi-way equi-join with configurable conflict and merge
//! policy. The planner is synchronous and fully materializes the batch list;
//! batch execution, cancellation and single-writer output discipline live in
//! [`exec`].

pub mod exec;
pub mod key;
pub mod merge;
pub mod planner;
pub mod policy;

pub use exec::{process_batches, CancellationFlag, OutputSink};
pub use key::GroupKey;
pub use merge::{merge_data_annotations, merge_text_annotations};
pub use planner::{Batch, BatchPlanner};
pub use policy::{BatchingPolicy, GroupingColumns, MissingSlotPolicy, MultiMatchPolicy};

//! Batch execution support: cancellation and single-writer output.
//!
//! Batches planned for one stage are mutually independent and may be
//! processed by a pool of workers; the pieces here are the two shared
//! points that discipline requires. Completion order stays unspecified -
//! only appends to one output table are serialized.

use crate::merge::{merge_data_annotations, merge_text_annotations};
use crate::planner::Batch;
use crate::policy::BatchingPolicy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;
use trellis_core::{RowIndex, TableRow, TrellisResult};
use trellis_table::DataTable;

/// Cooperative cancellation flag shared between an executor and its
/// workers. Checked between batches, never inside the planner's matching
/// pass; a cancelled stage leaves its output table partially populated but
/// internally consistent.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Single-writer front for one output table.
///
/// Many batches may compute results concurrently, but one output table
/// accepts appends from only one writer at a time; the mutex serializes
/// them, so no half-written row is ever observable.
#[derive(Debug)]
pub struct OutputSink {
    table: Mutex<DataTable>,
}

impl OutputSink {
    pub fn new(table: DataTable) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    /// Appends one result row as-is.
    pub fn append_row(&self, row: TableRow) -> RowIndex {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_row(row)
    }

    /// Appends one result row of a batch, merging the batch's carried
    /// annotations into it under the stage's merge policy. Annotations
    /// already on the row count as existing.
    pub fn write_batch_result(
        &self,
        mut row: TableRow,
        batch: &Batch,
        policy: &BatchingPolicy,
    ) -> TrellisResult<RowIndex> {
        let mut text = row.text_annotations().to_vec();
        merge_text_annotations(
            &mut text,
            batch.merged_text_annotations.iter().cloned(),
            policy.annotation_merge,
        )?;
        for annotation in text {
            row.set_text_annotation(annotation);
        }
        let mut data = row.data_annotations().to_vec();
        merge_data_annotations(
            &mut data,
            batch.merged_data_annotations.iter().cloned(),
            policy.data_annotation_merge,
        )?;
        for annotation in data {
            row.set_data_annotation(annotation);
        }
        Ok(self.append_row(row))
    }

    pub fn row_count(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .row_count()
    }

    /// Unwraps the finished output table.
    pub fn into_table(self) -> DataTable {
        self.table
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Runs `handler` over every batch in index order, checking the
/// cancellation flag between batches. Returns the number of batches
/// processed, which is smaller than `batches.len()` when cancelled.
///
/// Stages that declare themselves non-parallelizable are scheduled through
/// this single-worker path; parallel executors fan batches out themselves
/// and keep the same between-batches cancellation discipline.
pub fn process_batches<F>(
    batches: &[Batch],
    cancellation: &CancellationFlag,
    mut handler: F,
) -> TrellisResult<usize>
where
    F: FnMut(&Batch) -> TrellisResult<()>,
{
    let mut processed = 0;
    for batch in batches {
        if cancellation.is_cancelled() {
            debug!(processed, total = batches.len(), "stage cancelled");
            break;
        }
        handler(batch)?;
        processed += 1;
    }
    Ok(processed)
}

//! Batch planning: the multi-way equi-join over input slots.
//!
//! The planner runs synchronously and fully materializes the batch list
//! before stage execution begins. It only inspects in-memory annotation
//! values; per-row data loading never happens here. Batch indices are
//! deterministic: grouping tuples are enumerated in first-seen order across
//! slots in declaration order, and cross-product expansion walks rows in
//! table order with later slots varying fastest.

use crate::key::GroupKey;
use crate::merge::{merge_data_annotations, merge_text_annotations};
use crate::policy::{BatchingPolicy, MissingSlotPolicy, MultiMatchPolicy};
use std::collections::HashMap;
use tracing::{debug, warn};
use trellis_core::{
    BatchingError, DataAnnotation, RowIndex, SlotName, TextAnnotation, TrellisResult,
};
use trellis_table::DataTable;

/// One execution unit: at most one row per slot, plus the annotations the
/// stage's output rows inherit, merged per policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Deterministic position within the planned batch list.
    pub index: usize,
    /// The grouping tuple this batch was formed for.
    pub key: GroupKey,
    slots: Vec<(SlotName, Option<RowIndex>)>,
    pub merged_text_annotations: Vec<TextAnnotation>,
    pub merged_data_annotations: Vec<DataAnnotation>,
}

impl Batch {
    /// Per-slot row selection, in slot declaration order. `None` marks a
    /// slot absent in this batch.
    pub fn slots(&self) -> &[(SlotName, Option<RowIndex>)] {
        &self.slots
    }

    /// The selected row of one slot.
    pub fn row(&self, slot: &str) -> Option<RowIndex> {
        self.slots
            .iter()
            .find(|(name, _)| name == slot)
            .and_then(|(_, row)| *row)
    }

    /// Whether every slot contributed a row.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|(_, row)| row.is_some())
    }
}

/// Plans batches from the input tables of one stage.
pub struct BatchPlanner {
    policy: BatchingPolicy,
}

impl BatchPlanner {
    pub fn new(policy: BatchingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BatchingPolicy {
        &self.policy
    }

    /// Computes the batch list for the given input slots, in declaration
    /// order. Tables are read-only from here on (publication contract).
    pub fn plan(&self, inputs: &[(&str, &DataTable)]) -> TrellisResult<Vec<Batch>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let columns = self.policy.grouping.resolve(inputs);
        debug!(?columns, slots = inputs.len(), "resolved grouping columns");

        // Per slot, map every grouping tuple to the rows carrying it.
        // Tuples are numbered in first-seen order across slots.
        let mut key_order: Vec<GroupKey> = Vec::new();
        let mut key_index: HashMap<GroupKey, usize> = HashMap::new();
        let mut matched: Vec<HashMap<usize, Vec<RowIndex>>> = Vec::with_capacity(inputs.len());

        for (slot, table) in inputs {
            let mut slot_map: HashMap<usize, Vec<RowIndex>> = HashMap::new();
            for row in table.rows() {
                let key = GroupKey::project(row, &columns);
                let index = match key_index.get(&key) {
                    Some(&index) => index,
                    None => {
                        let index = key_order.len();
                        key_order.push(key.clone());
                        key_index.insert(key, index);
                        index
                    }
                };
                slot_map.entry(index).or_default().push(row.index);
            }
            debug!(slot, tuples = slot_map.len(), "grouped rows");
            matched.push(slot_map);
        }

        // Wildcard distribution: with multiple slots, rows carrying the
        // empty tuple match every tuple their slot has no direct match for.
        // The empty tuple then disappears from enumeration. With a single
        // slot (or no non-empty tuple at all) the empty tuple stays an
        // ordinary group, so fully unannotated inputs reduce to one batch
        // holding every row.
        let empty_index = key_index.get(&GroupKey::default()).copied();
        let has_non_empty = key_order.iter().any(|key| !key.is_empty());
        let distribute = empty_index.is_some() && has_non_empty && inputs.len() > 1;
        if let (true, Some(empty_index)) = (distribute, empty_index) {
            warn!("distributing unannotated rows across grouping tuples");
            for slot_map in &mut matched {
                let Some(rows) = slot_map.remove(&empty_index) else {
                    continue;
                };
                for (index, key) in key_order.iter().enumerate() {
                    if key.is_empty() || slot_map.contains_key(&index) {
                        continue;
                    }
                    slot_map.insert(index, rows.clone());
                }
            }
        }

        let mut batches: Vec<Batch> = Vec::new();
        'keys: for (key_position, key) in key_order.iter().enumerate() {
            if distribute && key.is_empty() {
                continue;
            }

            // Per-slot matches for this tuple, with the missing-slot and
            // multi-match policies applied.
            let mut slot_matches: Vec<Vec<RowIndex>> = Vec::with_capacity(inputs.len());
            for (slot_position, (slot, _)) in inputs.iter().enumerate() {
                let rows = matched[slot_position]
                    .get(&key_position)
                    .cloned()
                    .unwrap_or_default();
                if rows.is_empty() {
                    match self.policy.missing_slot {
                        MissingSlotPolicy::SkipBatch => continue 'keys,
                        MissingSlotPolicy::MarkAbsent => {}
                        MissingSlotPolicy::Fail => {
                            return Err(BatchingError::UnmatchedSlot {
                                slot: slot.to_string(),
                                key: key.to_string(),
                            }
                            .into())
                        }
                    }
                } else if rows.len() > 1
                    && matches!(self.policy.multi_match, MultiMatchPolicy::Fail)
                {
                    return Err(BatchingError::AmbiguousMatch {
                        slot: slot.to_string(),
                        key: key.to_string(),
                        rows,
                    }
                    .into());
                }
                slot_matches.push(rows);
            }

            // Cross-product expansion; later slots vary fastest.
            let mut combinations: Vec<Vec<Option<RowIndex>>> = vec![Vec::new()];
            for rows in &slot_matches {
                let mut expanded = Vec::with_capacity(combinations.len() * rows.len().max(1));
                for combination in &combinations {
                    if rows.is_empty() {
                        let mut next = combination.clone();
                        next.push(None);
                        expanded.push(next);
                    } else {
                        for &row in rows {
                            let mut next = combination.clone();
                            next.push(Some(row));
                            expanded.push(next);
                        }
                    }
                }
                combinations = expanded;
            }

            for combination in combinations {
                let mut text_annotations: Vec<TextAnnotation> = Vec::new();
                let mut data_annotations: Vec<DataAnnotation> = Vec::new();
                for (slot_position, row_index) in combination.iter().enumerate() {
                    let Some(row_index) = row_index else { continue };
                    if let Some(row) = inputs[slot_position].1.row(*row_index) {
                        merge_text_annotations(
                            &mut text_annotations,
                            row.text_annotations().iter().cloned(),
                            self.policy.annotation_merge,
                        )?;
                        merge_data_annotations(
                            &mut data_annotations,
                            row.data_annotations().iter().cloned(),
                            self.policy.data_annotation_merge,
                        )?;
                    }
                }
                batches.push(Batch {
                    index: batches.len(),
                    key: key.clone(),
                    slots: inputs
                        .iter()
                        .zip(&combination)
                        .map(|((slot, _), row)| (slot.to_string(), *row))
                        .collect(),
                    merged_text_annotations: text_annotations,
                    merged_data_annotations: data_annotations,
                });
            }
        }

        debug!(batches = batches.len(), "planned batches");
        Ok(batches)
    }
}

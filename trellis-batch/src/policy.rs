//! Per-stage batching policies.

use serde::{Deserialize, Serialize};
use trellis_core::{DataAnnotationMergeMode, TextAnnotationMergeMode};
use trellis_table::DataTable;

/// How the set of grouping columns is derived from the input slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingColumns {
    /// Annotation names present in every contributing slot (the default).
    #[default]
    Intersection,
    /// Annotation names present in any contributing slot.
    Union,
    /// An explicit column set declared by the stage.
    Custom(Vec<String>),
}

impl GroupingColumns {
    /// Resolves the grouping column set against the input slots, in a
    /// deterministic order: first-seen order across slots in declaration
    /// order (custom sets keep their declared order).
    pub fn resolve(&self, inputs: &[(&str, &DataTable)]) -> Vec<String> {
        match self {
            GroupingColumns::Intersection => {
                let mut columns: Vec<String> = Vec::new();
                for (i, (_, table)) in inputs.iter().enumerate() {
                    let slot_columns = table.text_annotation_columns();
                    if i == 0 {
                        columns = slot_columns;
                    } else {
                        columns.retain(|c| slot_columns.contains(c));
                    }
                }
                columns
            }
            GroupingColumns::Union => {
                let mut columns: Vec<String> = Vec::new();
                for (_, table) in inputs {
                    for column in table.text_annotation_columns() {
                        if !columns.contains(&column) {
                            columns.push(column);
                        }
                    }
                }
                columns
            }
            GroupingColumns::Custom(declared) => {
                let mut columns: Vec<String> = Vec::new();
                for column in declared {
                    if !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
                columns
            }
        }
    }
}

/// What to do when a slot has no row for a grouping tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingSlotPolicy {
    /// Drop the whole batch (the default).
    #[default]
    SkipBatch,
    /// Keep the batch with the slot explicitly marked absent.
    MarkAbsent,
    /// Missing matches are fatal: raise `BatchingError::UnmatchedSlot`.
    Fail,
}

/// What to do when a slot has more than one row for a grouping tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MultiMatchPolicy {
    /// Expand into the cross-product of the matching rows (the default).
    #[default]
    CrossProduct,
    /// Raise `BatchingError::AmbiguousMatch` naming the conflicting rows.
    Fail,
}

/// Complete batching configuration of one stage.
///
/// The annotation merge modes parameterize the output-write path, not the
/// planner's matching logic; they travel with the policy because stages
/// configure all of this together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchingPolicy {
    pub grouping: GroupingColumns,
    pub missing_slot: MissingSlotPolicy,
    pub multi_match: MultiMatchPolicy,
    pub annotation_merge: TextAnnotationMergeMode,
    pub data_annotation_merge: DataAnnotationMergeMode,
}

impl BatchingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grouping(mut self, grouping: GroupingColumns) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_missing_slot(mut self, policy: MissingSlotPolicy) -> Self {
        self.missing_slot = policy;
        self
    }

    pub fn with_multi_match(mut self, policy: MultiMatchPolicy) -> Self {
        self.multi_match = policy;
        self
    }

    pub fn with_annotation_merge(mut self, mode: TextAnnotationMergeMode) -> Self {
        self.annotation_merge = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{DataContext, DataTypeId, TableRow, TextAnnotation};

    fn table(rows: &[&[(&str, &str)]]) -> DataTable {
        let mut table = DataTable::new(DataTypeId::new("t"));
        for annotations in rows {
            let mut row = TableRow::new(0, DataTypeId::new("t"), DataContext::new("c"));
            for (name, value) in *annotations {
                row.set_text_annotation(TextAnnotation::new(*name, *value));
            }
            table.push_row(row);
        }
        table
    }

    #[test]
    fn test_intersection_keeps_shared_columns() {
        let a = table(&[&[("Sample", "A"), ("Slice", "1")]]);
        let b = table(&[&[("Sample", "B"), ("Channel", "dapi")]]);
        let columns =
            GroupingColumns::Intersection.resolve(&[("Input 1", &a), ("Input 2", &b)]);
        assert_eq!(columns, ["Sample"]);
    }

    #[test]
    fn test_union_first_seen_order() {
        let a = table(&[&[("Sample", "A"), ("Slice", "1")]]);
        let b = table(&[&[("Channel", "dapi"), ("Sample", "B")]]);
        let columns = GroupingColumns::Union.resolve(&[("Input 1", &a), ("Input 2", &b)]);
        assert_eq!(columns, ["Sample", "Slice", "Channel"]);
    }

    #[test]
    fn test_custom_preserves_declared_order() {
        let a = table(&[]);
        let columns = GroupingColumns::Custom(vec![
            "Slice".to_string(),
            "Sample".to_string(),
            "Slice".to_string(),
        ])
        .resolve(&[("Input 1", &a)]);
        assert_eq!(columns, ["Slice", "Sample"]);
    }
}

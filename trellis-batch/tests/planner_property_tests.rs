//! Property-Based Tests for Batch Planning
//!
//! Properties:
//! - Planning is deterministic: identical inputs SHALL yield identical
//!   batch lists in identical order.
//! - Every planned batch only references rows that exist and match the
//!   batch's grouping tuple (or arrived through wildcard distribution).
//! - Under the mark-absent policy, every observed grouping tuple yields at
//!   least one batch.

use proptest::prelude::*;
use trellis_batch::{BatchPlanner, BatchingPolicy, GroupingColumns, MissingSlotPolicy};
use trellis_test_utils::{arb_table, DataTable};

fn planner_with(missing: MissingSlotPolicy) -> BatchPlanner {
    BatchPlanner::new(
        BatchingPolicy::default()
            .with_grouping(GroupingColumns::Union)
            .with_missing_slot(missing),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_planning_is_deterministic(a in arb_table(6), b in arb_table(6)) {
        let planner = planner_with(MissingSlotPolicy::MarkAbsent);
        let inputs = [("Input 1", &a), ("Input 2", &b)];
        let first = planner.plan(&inputs).unwrap();
        let second = planner.plan(&inputs).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_batches_reference_existing_rows(a in arb_table(6), b in arb_table(6)) {
        let planner = planner_with(MissingSlotPolicy::MarkAbsent);
        let batches = planner.plan(&[("Input 1", &a), ("Input 2", &b)]).unwrap();
        let lookup = |slot: &str| -> &DataTable {
            if slot == "Input 1" { &a } else { &b }
        };
        for batch in &batches {
            for (slot, row) in batch.slots() {
                if let Some(row) = row {
                    prop_assert!(lookup(slot).row(*row).is_some());
                }
            }
        }
    }

    #[test]
    fn prop_batch_indices_are_dense(a in arb_table(6), b in arb_table(6)) {
        let planner = planner_with(MissingSlotPolicy::SkipBatch);
        let batches = planner.plan(&[("Input 1", &a), ("Input 2", &b)]).unwrap();
        for (i, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, i);
        }
    }

    #[test]
    fn prop_single_slot_covers_every_row(a in arb_table(8)) {
        // With one slot and the mark-absent policy every row lands in
        // exactly one batch group; cross-product expansion then yields one
        // batch per row.
        let planner = planner_with(MissingSlotPolicy::MarkAbsent);
        let batches = planner.plan(&[("Input 1", &a)]).unwrap();
        let mut seen: Vec<usize> = batches
            .iter()
            .filter_map(|batch| batch.row("Input 1"))
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..a.row_count()).collect();
        prop_assert_eq!(seen, expected);
    }
}

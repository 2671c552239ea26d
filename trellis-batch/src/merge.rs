//! Applying annotation merge modes.
//!
//! Collision detection uses the same name-equality contract as row-level
//! annotation lookup. `TextAnnotationMergeMode::Merge` keeps the existing
//! value on a conflicting collision and logs the discarded one;
//! `OverwriteExisting` lets the incoming value win; `SkipExisting` drops
//! incoming duplicates silently; `Fail` raises [`MergeError::Conflict`].

use tracing::debug;
use trellis_core::{
    DataAnnotation, DataAnnotationMergeMode, MergeError, TextAnnotation, TextAnnotationMergeMode,
};

/// Merges `incoming` text annotations into `target` under `mode`.
pub fn merge_text_annotations(
    target: &mut Vec<TextAnnotation>,
    incoming: impl IntoIterator<Item = TextAnnotation>,
    mode: TextAnnotationMergeMode,
) -> Result<(), MergeError> {
    for annotation in incoming {
        let existing = target.iter_mut().find(|a| a.name_equals(&annotation.name));
        match existing {
            None => target.push(annotation),
            Some(existing) if existing.value == annotation.value => {}
            Some(existing) => match mode {
                TextAnnotationMergeMode::Merge => {
                    debug!(
                        name = %annotation.name,
                        kept = %existing.value,
                        discarded = %annotation.value,
                        "annotation collision, keeping existing value"
                    );
                }
                TextAnnotationMergeMode::OverwriteExisting => {
                    *existing = annotation;
                }
                TextAnnotationMergeMode::SkipExisting => {}
                TextAnnotationMergeMode::Fail => {
                    return Err(MergeError::Conflict {
                        name: annotation.name,
                        existing: existing.value.clone(),
                        incoming: annotation.value,
                    });
                }
            },
        }
    }
    Ok(())
}

/// Merges `incoming` data annotations into `target` under `mode`.
pub fn merge_data_annotations(
    target: &mut Vec<DataAnnotation>,
    incoming: impl IntoIterator<Item = DataAnnotation>,
    mode: DataAnnotationMergeMode,
) -> Result<(), MergeError> {
    for annotation in incoming {
        let existing = target.iter_mut().find(|a| a.name_equals(&annotation.name));
        match existing {
            None => target.push(annotation),
            Some(existing) if existing.storage_folder == annotation.storage_folder => {}
            Some(existing) => match mode {
                DataAnnotationMergeMode::Merge => {
                    debug!(
                        name = %annotation.name,
                        kept = %existing.storage_folder.display(),
                        discarded = %annotation.storage_folder.display(),
                        "data annotation collision, keeping existing artifact"
                    );
                }
                DataAnnotationMergeMode::OverwriteExisting => {
                    *existing = annotation;
                }
                DataAnnotationMergeMode::SkipExisting => {}
                DataAnnotationMergeMode::Fail => {
                    return Err(MergeError::Conflict {
                        name: annotation.name.clone(),
                        existing: existing.storage_folder.display().to_string(),
                        incoming: annotation.storage_folder.display().to_string(),
                    });
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::DataTypeId;

    fn ann(name: &str, value: &str) -> TextAnnotation {
        TextAnnotation::new(name, value)
    }

    #[test]
    fn test_merge_keeps_existing_on_conflict() {
        let mut target = vec![ann("Sample", "A")];
        merge_text_annotations(
            &mut target,
            [ann("Sample", "B"), ann("Slice", "1")],
            TextAnnotationMergeMode::Merge,
        )
        .unwrap();
        assert_eq!(target, vec![ann("Sample", "A"), ann("Slice", "1")]);
    }

    #[test]
    fn test_overwrite_existing_lets_incoming_win() {
        let mut target = vec![ann("Sample", "A")];
        merge_text_annotations(
            &mut target,
            [ann("Sample", "B")],
            TextAnnotationMergeMode::OverwriteExisting,
        )
        .unwrap();
        assert_eq!(target, vec![ann("Sample", "B")]);
    }

    #[test]
    fn test_fail_raises_conflict_with_both_values() {
        let mut target = vec![ann("Sample", "A")];
        let err = merge_text_annotations(
            &mut target,
            [ann("Sample", "B")],
            TextAnnotationMergeMode::Fail,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MergeError::Conflict {
                name: "Sample".to_string(),
                existing: "A".to_string(),
                incoming: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_identical_values_never_conflict() {
        let mut target = vec![ann("Sample", "A")];
        merge_text_annotations(
            &mut target,
            [ann("Sample", "A")],
            TextAnnotationMergeMode::Fail,
        )
        .unwrap();
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn test_data_annotation_merge_by_name() {
        let mask = |path: &str| DataAnnotation::new("Mask", path, DataTypeId::new("mask"));
        let mut target = vec![mask("data-annotations/0/Mask")];
        merge_data_annotations(
            &mut target,
            [mask("data-annotations/1/Mask")],
            DataAnnotationMergeMode::SkipExisting,
        )
        .unwrap();
        assert_eq!(
            target[0].storage_folder.to_string_lossy(),
            "data-annotations/0/Mask"
        );

        let err = merge_data_annotations(
            &mut target,
            [mask("data-annotations/1/Mask")],
            DataAnnotationMergeMode::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::Conflict { .. }));
    }
}

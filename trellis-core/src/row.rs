//! Table rows and their annotation stores.

use crate::annotation::{DataAnnotation, TextAnnotation};
use crate::context::DataContext;
use crate::registry::DataTypeId;
use crate::RowIndex;
use serde::{Deserialize, Serialize};

/// One data item of a table.
///
/// A row is immutable once appended to a table except for its two
/// annotation sets, which downstream stages may grow or shrink as they
/// attach derived labels. Annotation names are unique within a row; the
/// replace-or-insert operations below are the only write paths.
///
/// Mutating annotations through the owning table invalidates the table's
/// schema caches; code holding a bare `TableRow` (before it is appended)
/// may mutate it freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub index: RowIndex,
    pub true_type: DataTypeId,
    pub context: DataContext,
    text_annotations: Vec<TextAnnotation>,
    data_annotations: Vec<DataAnnotation>,
}

impl TableRow {
    pub fn new(index: RowIndex, true_type: DataTypeId, context: DataContext) -> Self {
        Self {
            index,
            true_type,
            context,
            text_annotations: Vec::new(),
            data_annotations: Vec::new(),
        }
    }

    pub fn text_annotations(&self) -> &[TextAnnotation] {
        &self.text_annotations
    }

    pub fn data_annotations(&self) -> &[DataAnnotation] {
        &self.data_annotations
    }

    /// Looks up a text annotation by name.
    pub fn text_annotation(&self, name: &str) -> Option<&TextAnnotation> {
        self.text_annotations.iter().find(|a| a.name_equals(name))
    }

    /// Looks up a data annotation by name.
    pub fn data_annotation(&self, name: &str) -> Option<&DataAnnotation> {
        self.data_annotations.iter().find(|a| a.name_equals(name))
    }

    /// Replaces-or-inserts a text annotation by name. Last write wins.
    pub fn set_text_annotation(&mut self, annotation: TextAnnotation) {
        match self
            .text_annotations
            .iter_mut()
            .find(|a| a.name_equals(&annotation.name))
        {
            Some(existing) => *existing = annotation,
            None => self.text_annotations.push(annotation),
        }
    }

    /// Replaces-or-inserts a data annotation by name and takes ownership
    /// of it for this row.
    pub fn set_data_annotation(&mut self, mut annotation: DataAnnotation) {
        annotation.owner = Some(self.index);
        match self
            .data_annotations
            .iter_mut()
            .find(|a| a.name_equals(&annotation.name))
        {
            Some(existing) => *existing = annotation,
            None => self.data_annotations.push(annotation),
        }
    }

    /// Removes a text annotation by name, returning it if present.
    pub fn remove_text_annotation(&mut self, name: &str) -> Option<TextAnnotation> {
        let position = self.text_annotations.iter().position(|a| a.name_equals(name))?;
        Some(self.text_annotations.remove(position))
    }

    /// Removes a data annotation by name, returning it if present.
    pub fn remove_data_annotation(&mut self, name: &str) -> Option<DataAnnotation> {
        let position = self.data_annotations.iter().position(|a| a.name_equals(name))?;
        Some(self.data_annotations.remove(position))
    }

    /// Re-points every data annotation at this row. Used by the two-pass
    /// deserializer after the full row list is materialized, and by tables
    /// when rows are re-indexed.
    pub fn relink_data_annotations(&mut self) {
        let index = self.index;
        for annotation in &mut self.data_annotations {
            annotation.owner = Some(index);
        }
    }
}

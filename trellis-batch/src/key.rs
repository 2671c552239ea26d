//! Grouping keys: the projection of a row onto the grouping columns.

use std::fmt;
use trellis_core::TableRow;

/// The tuple of grouping-annotation values present on one row.
///
/// Only columns the row actually carries appear in the key; a row with none
/// of the grouping annotations projects to the empty key, which acts as a
/// wildcard during planning. Pairs are ordered by the resolved grouping
/// column order, so equal projections compare equal regardless of the order
/// annotations were attached in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GroupKey(Vec<(String, String)>);

impl GroupKey {
    /// Projects a row onto the grouping columns. `columns` must already be
    /// in the planner's resolved order.
    pub fn project(row: &TableRow, columns: &[String]) -> Self {
        let mut pairs = Vec::new();
        for column in columns {
            if let Some(annotation) = row.text_annotation(column) {
                pairs.push((column.clone(), annotation.value.clone()));
            }
        }
        Self(pairs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// The value for one grouping column, if present in this key.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}")
    }
}

//! Read-only tabular view exposed to presentation layers.
//!
//! Column layout: three fixed columns (0 = Index, 1 = Data type,
//! 2 = Preview), then one column per data-annotation name (prefixed `$`),
//! then one column per text-annotation name. Column-index translation is
//! pure arithmetic over the two cached column lists, never a search.

use crate::{DataTable, MergedTable};
use trellis_core::{DataAnnotation, DataTypeId};

/// Number of fixed leading columns in every tabular view.
pub const FIXED_COLUMNS: usize = 3;

/// What kind of value a view column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Index,
    DataType,
    Preview,
    DataAnnotation,
    TextAnnotation,
}

/// One cell of the tabular view.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Index(usize),
    DataType(DataTypeId),
    Preview(String),
    /// `None` when the row carries no data annotation for this column.
    DataAnnotation(Option<DataAnnotation>),
    /// `None` when the row carries no text annotation for this column.
    TextAnnotation(Option<String>),
}

/// Plain tabular-data contract consumed by presentation layers.
///
/// Read-only: `set_value_at` is a no-op by contract, present only so view
/// adapters can treat every model uniformly.
pub trait TableModel {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn column_name(&self, column: usize) -> Option<String>;

    fn column_value_kind(&self, column: usize) -> Option<ColumnKind>;

    fn value_at(&self, row: usize, column: usize) -> Option<CellValue>;

    /// No-op by contract; mutation never happens through the view.
    fn set_value_at(&mut self, _row: usize, _column: usize, _value: CellValue) {}
}

/// Translates an absolute column index into a data-annotation column index,
/// or `None` if the column is not one.
pub(crate) fn to_data_annotation_column(column: usize, data_columns: usize) -> Option<usize> {
    if column >= FIXED_COLUMNS && column < FIXED_COLUMNS + data_columns {
        Some(column - FIXED_COLUMNS)
    } else {
        None
    }
}

/// Translates an absolute column index into a text-annotation column index,
/// or `None` if the column is not one.
pub(crate) fn to_text_annotation_column(
    column: usize,
    data_columns: usize,
    text_columns: usize,
) -> Option<usize> {
    if column >= FIXED_COLUMNS + data_columns
        && column < FIXED_COLUMNS + data_columns + text_columns
    {
        Some(column - FIXED_COLUMNS - data_columns)
    } else {
        None
    }
}

pub(crate) fn fixed_column_name(column: usize) -> Option<&'static str> {
    match column {
        0 => Some("Index"),
        1 => Some("Data type"),
        2 => Some("Preview"),
        _ => None,
    }
}

impl TableModel for DataTable {
    fn row_count(&self) -> usize {
        DataTable::row_count(self)
    }

    fn column_count(&self) -> usize {
        FIXED_COLUMNS + self.data_annotation_columns().len() + self.text_annotation_columns().len()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        if let Some(name) = fixed_column_name(column) {
            return Some(name.to_string());
        }
        let data_columns = self.data_annotation_columns();
        if let Some(i) = to_data_annotation_column(column, data_columns.len()) {
            return Some(format!("${}", data_columns[i]));
        }
        let text_columns = self.text_annotation_columns();
        to_text_annotation_column(column, data_columns.len(), text_columns.len())
            .map(|i| text_columns[i].clone())
    }

    fn column_value_kind(&self, column: usize) -> Option<ColumnKind> {
        match column {
            0 => Some(ColumnKind::Index),
            1 => Some(ColumnKind::DataType),
            2 => Some(ColumnKind::Preview),
            _ => {
                let data_columns = self.data_annotation_columns().len();
                let text_columns = self.text_annotation_columns().len();
                if to_data_annotation_column(column, data_columns).is_some() {
                    Some(ColumnKind::DataAnnotation)
                } else if to_text_annotation_column(column, data_columns, text_columns).is_some() {
                    Some(ColumnKind::TextAnnotation)
                } else {
                    None
                }
            }
        }
    }

    fn value_at(&self, row: usize, column: usize) -> Option<CellValue> {
        let table_row = self.row(row)?;
        match column {
            0 => Some(CellValue::Index(table_row.index)),
            1 => Some(CellValue::DataType(table_row.true_type.clone())),
            2 => Some(CellValue::Preview(format!(
                "{} [{}]",
                table_row.index, table_row.true_type
            ))),
            _ => {
                let data_columns = self.data_annotation_columns();
                if let Some(i) = to_data_annotation_column(column, data_columns.len()) {
                    return Some(CellValue::DataAnnotation(
                        table_row.data_annotation(&data_columns[i]).cloned(),
                    ));
                }
                let text_columns = self.text_annotation_columns();
                to_text_annotation_column(column, data_columns.len(), text_columns.len()).map(|i| {
                    CellValue::TextAnnotation(
                        table_row
                            .text_annotation(&text_columns[i])
                            .map(|a| a.value.clone()),
                    )
                })
            }
        }
    }
}

impl TableModel for MergedTable {
    fn row_count(&self) -> usize {
        MergedTable::row_count(self)
    }

    fn column_count(&self) -> usize {
        FIXED_COLUMNS + self.data_annotation_columns().len() + self.text_annotation_columns().len()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        if let Some(name) = fixed_column_name(column) {
            return Some(name.to_string());
        }
        let data_columns = self.data_annotation_columns();
        if let Some(i) = to_data_annotation_column(column, data_columns.len()) {
            return Some(format!("${}", data_columns[i]));
        }
        let text_columns = self.text_annotation_columns();
        to_text_annotation_column(column, data_columns.len(), text_columns.len())
            .map(|i| text_columns[i].to_string())
    }

    fn column_value_kind(&self, column: usize) -> Option<ColumnKind> {
        match column {
            0 => Some(ColumnKind::Index),
            1 => Some(ColumnKind::DataType),
            2 => Some(ColumnKind::Preview),
            _ => {
                let data_columns = self.data_annotation_columns().len();
                let text_columns = self.text_annotation_columns().len();
                if to_data_annotation_column(column, data_columns).is_some() {
                    Some(ColumnKind::DataAnnotation)
                } else if to_text_annotation_column(column, data_columns, text_columns).is_some() {
                    Some(ColumnKind::TextAnnotation)
                } else {
                    None
                }
            }
        }
    }

    fn value_at(&self, row: usize, column: usize) -> Option<CellValue> {
        let (provenance, table_row) = self.get(row)?;
        match column {
            0 => Some(CellValue::Index(table_row.index)),
            1 => Some(CellValue::DataType(table_row.true_type.clone())),
            2 => Some(CellValue::Preview(format!(
                "{}/{} row {} [{}]",
                provenance.branch, provenance.stage, table_row.index, table_row.true_type
            ))),
            _ => {
                let data_columns = self.data_annotation_columns();
                if let Some(i) = to_data_annotation_column(column, data_columns.len()) {
                    return Some(CellValue::DataAnnotation(
                        table_row.data_annotation(&data_columns[i]).cloned(),
                    ));
                }
                let text_columns = self.text_annotation_columns();
                to_text_annotation_column(column, data_columns.len(), text_columns.len()).map(|i| {
                    CellValue::TextAnnotation(
                        table_row
                            .text_annotation(&text_columns[i])
                            .map(|a| a.value.clone()),
                    )
                })
            }
        }
    }
}

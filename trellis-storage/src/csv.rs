//! Flat CSV projection of a table.
//!
//! One line per row. Fixed columns `trellis:data-type`,
//! `trellis:true-data-type`, `trellis:index` and `trellis:data-context`
//! come first, then one column per data-annotation name (prefixed `$` to
//! disambiguate the two annotation kinds in the flat format), then one per
//! text-annotation name. A present data annotation renders as
//! `"<storage-path> [<type-id>]"`; anything missing renders as the empty
//! string.

use std::fs;
use std::path::Path;
use trellis_core::StorageError;
use trellis_table::DataTable;

/// RFC-4180 field quoting: quote when the field contains a separator,
/// quote or line break; double embedded quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders the CSV projection of `table` as a string.
pub fn to_csv_string(table: &DataTable) -> Result<String, StorageError> {
    let data_columns = table.data_annotation_columns();
    let text_columns = table.text_annotation_columns();

    let mut header: Vec<String> = vec![
        "trellis:data-type".to_string(),
        "trellis:true-data-type".to_string(),
        "trellis:index".to_string(),
        "trellis:data-context".to_string(),
    ];
    header.extend(data_columns.iter().map(|c| format!("${c}")));
    header.extend(text_columns.iter().cloned());

    let mut lines = Vec::with_capacity(table.row_count() + 1);
    lines.push(
        header
            .iter()
            .map(|f| escape_field(f))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in table.rows() {
        let context = serde_json::to_string(&row.context).map_err(|e| {
            StorageError::MalformedDocument {
                path: Path::new("<csv>").to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let mut fields: Vec<String> = vec![
            table.accepted_type().to_string(),
            row.true_type.to_string(),
            row.index.to_string(),
            context,
        ];
        for column in &data_columns {
            fields.push(match row.data_annotation(column) {
                Some(annotation) => format!(
                    "{} [{}]",
                    annotation.storage_folder.display(),
                    annotation.true_type
                ),
                None => String::new(),
            });
        }
        for column in &text_columns {
            fields.push(match row.text_annotation(column) {
                Some(annotation) => annotation.value.clone(),
                None => String::new(),
            });
        }
        lines.push(
            fields
                .iter()
                .map(|f| escape_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Writes the CSV projection of `table` to `path`. Aborts entirely on
/// error.
pub fn save_as_csv(table: &DataTable, path: &Path) -> Result<(), StorageError> {
    let csv = to_csv_string(table)?;
    fs::write(path, csv).map_err(|e| StorageError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

//! CSV export of record collections.
//!
//! One rule for every entity: RFC 4180 conditional quoting, CRLF line
//! endings, and list values joined with [`MULTI_VALUE_DELIMITER`].

use std::borrow::Cow;
use std::path::Path;

use crate::errors::AppError;
use crate::models::{Entity, FieldValue, SHARED_COLUMNS};

/// Joins list values such as tags inside a single column.
pub const MULTI_VALUE_DELIMITER: &str = "|";

const LINE_ENDING: &str = "\r\n";

/// Quote a field when it contains a comma, a double quote, CR or LF.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Flatten a field value to its cell text.
pub fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items.join(MULTI_VALUE_DELIMITER),
        FieldValue::Number(number) => number.to_string(),
        FieldValue::Integer(number) => number.to_string(),
    }
}

fn is_known_column<E: Entity>(name: &str) -> bool {
    SHARED_COLUMNS.contains(&name) || E::EXPORTABLE_COLUMNS.contains(&name)
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = Cow<'a, str>>) {
    for (index, cell) in cells.enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&cell);
    }
    out.push_str(LINE_ENDING);
}

/// Render `records` as CSV with the given header columns.
///
/// An empty column list means `E::CSV_COLUMNS`.
pub fn export_csv<E: Entity, S: AsRef<str>>(records: &[E], columns: &[S]) -> Result<String, AppError> {
    let columns: Vec<&str> = if columns.is_empty() {
        E::CSV_COLUMNS.to_vec()
    } else {
        columns.iter().map(AsRef::as_ref).collect()
    };

    if let Some(unknown) = columns.iter().find(|c| !is_known_column::<E>(c)) {
        return Err(AppError::Validation(format!(
            "Unknown export column '{}' for {}",
            unknown,
            E::KIND
        )));
    }

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|c| escape_field(c)));

    for record in records {
        let cells = columns.iter().map(|column| {
            let value = record
                .column(column)
                .map(|v| render_value(&v))
                .unwrap_or_default();
            Cow::Owned(escape_field(&value).into_owned())
        });
        push_row(&mut out, cells);
    }

    tracing::debug!("Exported {} {} records", records.len(), E::KIND);
    Ok(out)
}

/// Write rendered CSV to a file, creating parent directories.
pub async fn write_to(path: &Path, csv: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Internal(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    tokio::fs::write(path, csv)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", path.display(), e)))
}

//! Column normalization: header cleanup and numeric coercion.

use tracing::debug;

use crate::table::{Column, Table};

/// Strips `marker` from every header and trims surrounding whitespace.
pub fn clean_headers(table: &mut Table, marker: &str) {
    table.rename_headers(|header| header.replace(marker, "").trim().to_string());
}

/// Coerces a single raw cell to a number.
///
/// Every character that is not an ASCII digit or `.` is removed first, so
/// `€1,299.00` becomes `1299.00`. Anything that still fails to parse, or
/// parses to a non-finite value, is missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts each listed column that exists in `table` to numeric.
///
/// Absent columns are skipped and rows are never dropped. Returns the number
/// of columns converted.
pub fn coerce_columns<S: AsRef<str>>(table: &mut Table, numeric_columns: &[S]) -> usize {
    let dataset = table.name().to_string();
    let mut converted = 0;

    for name in numeric_columns {
        let name = name.as_ref();
        let Some(column) = table.column_mut(name) else {
            debug!(dataset = %dataset, column = name, "Numeric column absent, skipping");
            continue;
        };

        if let Column::Text(cells) = &*column {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| cell.as_deref().and_then(coerce_numeric))
                .collect();
            let missing = values.iter().filter(|v| v.is_none()).count();
            debug!(dataset = %dataset, column = name, missing, "Column coerced to numeric");

            *column = Column::Numeric(values);
            converted += 1;
        }
    }

    converted
}

use indexmap::IndexSet;

use crate::error::Result;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Row selection helpers
// ---------------------------------------------------------------------------

/// Distinct non-null values of a column in first-seen order.
pub fn distinct_non_null(column: &Column) -> Vec<CellValue> {
    column
        .values
        .iter()
        .filter(|v| !v.is_null())
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Indices of rows whose `column` equals `value`, in table order.
pub fn rows_matching(table: &Table, column: &str, value: &CellValue) -> Result<Vec<usize>> {
    let column = table.column(column)?;
    Ok(column
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| *v == value)
        .map(|(i, _)| i)
        .collect())
}

/// Stable ascending sort of row indices by the `date_column` of `table`.
/// Rows with a null date sort first.
pub fn sort_by_date(table: &Table, date_column: &str, rows: &mut [usize]) -> Result<()> {
    let dates = table.column(date_column)?;
    rows.sort_by_key(|&i| dates.values[i].as_date());
    Ok(())
}

/// Gather the cells of `column` at the given rows.
pub fn take(column: &Column, rows: &[usize]) -> Vec<CellValue> {
    rows.iter().map(|&i| column.values[i].clone()).collect()
}

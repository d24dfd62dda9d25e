use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Filter selection: which values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of accepted values.
/// If a column is absent or its set is empty, it imposes no constraint.
pub type FilterSelection = BTreeMap<String, BTreeSet<CellValue>>;

/// Sorted distinct non-missing values of a column (empty for unknown columns).
pub fn distinct_values(table: &Table, column: &str) -> BTreeSet<CellValue> {
    let Some(col) = table.column_index(column) else {
        return BTreeSet::new();
    };
    table
        .rows()
        .iter()
        .map(|row| &row[col])
        .filter(|v| !v.is_null())
        .cloned()
        .collect()
}

/// Return indices of rows that pass all active constraints, in row order.
///
/// A row passes a column constraint when:
/// * The column is absent from `selection` or its set is empty → passes
/// * The row's value for that column is in the accepted set → passes
///
/// `Null` cells never pass an active constraint, and a constraint on a column
/// the table does not have rejects every row.
pub fn filtered_rows(table: &Table, selection: &FilterSelection) -> Vec<usize> {
    let active: Vec<(Option<usize>, &BTreeSet<CellValue>)> = selection
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .map(|(col, accepted)| (table.column_index(col), accepted))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|(col, accepted)| match col {
                Some(idx) => {
                    let value = &row[*idx];
                    !value.is_null() && accepted.contains(value)
                }
                None => false,
            })
        })
        .map(|(i, _)| i)
        .collect()
}

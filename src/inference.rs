//! Column type inference over a bounded row sample.

use crate::types::{ColumnInfo, TypeTable};

/// Upper bound on rows read for inference, independent of dataset size.
pub const SAMPLE_ROW_LIMIT: usize = 500;

/// Assign exactly one semantic type per header from a sample of rows.
///
/// For each column, the table's specs are tried in precedence order; the first
/// whose matcher accepts every non-empty sampled cell wins. Empty cells never
/// falsify a hypothesis, so a sparse column still gets the tightest type its
/// present values allow. The table's trailing fallback guarantees the walk
/// terminates with an assignment, independent of row order.
pub fn infer_columns(
    headers: &[String],
    sample: &[Vec<String>],
    table: &TypeTable,
) -> Vec<ColumnInfo> {
    headers
        .iter()
        .enumerate()
        .map(|(column, name)| {
            let spec = table
                .specs()
                .iter()
                .find(|spec| {
                    sample
                        .iter()
                        .map(|row| row.get(column).map(String::as_str).unwrap_or(""))
                        .all(|cell| cell.is_empty() || spec.matches(cell))
                })
                .unwrap_or_else(|| table.fallback());
            ColumnInfo::new(name.clone(), spec.column_type)
        })
        .collect()
}

use foundation::Statistics;
use formats::{Table, parse_number};
use serde::Serialize;

pub const DEFAULT_SUMMARY_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Summarize up to `max_columns` of `headers` that hold at least one numeric
/// cell.
///
/// Statistics only cover the numeric cells of a column; blank or textual cells
/// are skipped, never counted as zero. Column order follows `headers`.
pub fn summarize_numeric(
    table: &Table,
    headers: &[String],
    max_columns: usize,
) -> Vec<NumericSummary> {
    headers
        .iter()
        .filter_map(|header| {
            let values: Vec<f64> = table.column(header).filter_map(parse_number).collect();
            let (min, max) = Statistics::min_max(&values)?;
            let average = Statistics::mean(&values)?;
            Some(NumericSummary {
                column: header.clone(),
                min,
                max,
                average,
            })
        })
        .take(max_columns)
        .collect()
}

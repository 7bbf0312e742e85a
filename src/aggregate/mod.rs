//! Aggregation pipeline
//!
//! Pure functions from chart rows to dashboard structures. Nothing here
//! touches the database: the same [`RawResult`] always produces the same
//! output, and an empty result is a valid "no data" answer rather than
//! an error.

mod macros;
mod weight;

pub use macros::{DailyMacroSummary, MacroBreakdown, MacroSummary, summarize_macros};
pub use weight::{WeightTrendPoint, summarize_weight};

use crate::db::{CellValue, RawResult};
use crate::error::{AggregationError, AggregationResult};
use rust_decimal::Decimal;

/// Resolve a required column by name
fn column(raw: &RawResult, name: &'static str) -> AggregationResult<usize> {
    raw.column_index(name)
        .ok_or(AggregationError::MissingColumn(name))
}

/// Rows with their index, refusing any row that is shorter or longer than
/// the column list
fn rows(raw: &RawResult) -> AggregationResult<Vec<(usize, &[CellValue])>> {
    let expected = raw.columns.len();
    raw.rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if row.values.len() == expected {
                Ok((i, row.values.as_slice()))
            } else {
                Err(AggregationError::RaggedRow {
                    row: i,
                    found: row.values.len(),
                    expected,
                })
            }
        })
        .collect()
}

/// A number that may be NULL; NULL sums as zero
fn amount(cell: &CellValue, row: usize, column: &'static str) -> AggregationResult<Decimal> {
    if cell.is_null() {
        return Ok(Decimal::ZERO);
    }
    cell.as_decimal()
        .ok_or(AggregationError::NotNumeric { row, column })
}

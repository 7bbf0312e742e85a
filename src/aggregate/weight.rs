//! Weight trend

use super::{column, rows};
use crate::db::{CellValue, RawResult};
use crate::error::{AggregationError, AggregationResult};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

const DATE: &str = "date";
const WEIGHT: &str = "user_weight";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTrendPoint {
    pub date: NaiveDateTime,
    pub weight: Decimal,
}

/// One point per row, oldest first. Rows sharing a timestamp keep their
/// original order.
pub fn summarize_weight(raw: &RawResult) -> AggregationResult<Vec<WeightTrendPoint>> {
    let date = column(raw, DATE)?;
    let weight = column(raw, WEIGHT)?;

    let mut points = rows(raw)?
        .into_iter()
        .map(|(i, values)| {
            let at = values[date]
                .as_datetime()
                .ok_or(AggregationError::InvalidDate { row: i, column: DATE })?;
            let kg = match &values[weight] {
                CellValue::Null => {
                    return Err(AggregationError::NullValue { row: i, column: WEIGHT });
                }
                cell => cell
                    .as_decimal()
                    .ok_or(AggregationError::NotNumeric { row: i, column: WEIGHT })?,
            };
            Ok(WeightTrendPoint { date: at, weight: kg })
        })
        .collect::<AggregationResult<Vec<_>>>()?;

    // sort_by_key is stable
    points.sort_by_key(|p| p.date);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::scripted::raw;
    use chrono::NaiveDate;

    fn midnight(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_sorted_ascending() {
        let input = raw(
            &[DATE, WEIGHT],
            vec![
                vec![CellValue::from("2024-01-02"), CellValue::Integer(180)],
                vec![CellValue::from("2024-01-01"), CellValue::Integer(175)],
            ],
        );
        let trend = summarize_weight(&input).unwrap();
        assert_eq!(
            trend,
            vec![
                WeightTrendPoint {
                    date: midnight(1),
                    weight: Decimal::from(175)
                },
                WeightTrendPoint {
                    date: midnight(2),
                    weight: Decimal::from(180)
                },
            ]
        );
    }

    #[test]
    fn test_ties_keep_row_order() {
        let input = raw(
            &[WEIGHT, DATE],
            vec![
                vec![CellValue::Integer(81), CellValue::Timestamp(midnight(3))],
                vec![CellValue::Integer(80), CellValue::Timestamp(midnight(1))],
                vec![CellValue::Integer(79), CellValue::Timestamp(midnight(3))],
            ],
        );
        let weights: Vec<Decimal> = summarize_weight(&input)
            .unwrap()
            .into_iter()
            .map(|p| p.weight)
            .collect();
        assert_eq!(
            weights,
            vec![Decimal::from(80), Decimal::from(81), Decimal::from(79)]
        );
    }

    #[test]
    fn test_no_rows() {
        assert!(summarize_weight(&raw(&[DATE, WEIGHT], vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_null_weight_is_an_error() {
        let input = raw(
            &[DATE, WEIGHT],
            vec![vec![CellValue::from("2024-01-01"), CellValue::Null]],
        );
        assert_eq!(
            summarize_weight(&input),
            Err(AggregationError::NullValue { row: 0, column: WEIGHT })
        );
    }
}

//! Per-day calorie and macro totals

use super::{amount, column, rows};
use crate::db::{CellValue, RawResult};
use crate::error::{AggregationError, AggregationResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

const USER_ID: &str = "user_id";
const USERNAME: &str = "username";
const DATE: &str = "date";
const CALORIES: &str = "total_calories";
const PROTEIN: &str = "total_protein";
const CARBS: &str = "total_carbs";
const FATS: &str = "total_fats";
const MEALS: &str = "total_meals";

/// Totals for one user on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMacroSummary {
    pub user_id: i64,
    pub username: String,
    pub date: NaiveDate,
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbs: Decimal,
    pub total_fats: Decimal,
    pub total_meals: i64,
}

/// Macro grams for the pie chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroBreakdown {
    pub date: NaiveDate,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
}

/// Every day in ascending order, plus the most recent one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacroSummary {
    pub daily: Vec<DailyMacroSummary>,
    pub latest: Option<DailyMacroSummary>,
}

impl MacroSummary {
    /// True when there were no rows at all
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// The latest day's macros, or `None` when there is no data
    pub fn breakdown(&self) -> Option<MacroBreakdown> {
        self.latest.as_ref().map(|day| MacroBreakdown {
            date: day.date,
            protein: day.total_protein,
            carbs: day.total_carbs,
            fats: day.total_fats,
        })
    }
}

/// Group rows by (day, user id, username) and sum the numeric columns.
///
/// Timestamps are truncated to their day. NULL numbers count as zero;
/// anything else that is not a number is an error. Output is ordered by
/// date, then user id, then username. `latest` is the first group on the
/// maximum date.
pub fn summarize_macros(raw: &RawResult) -> AggregationResult<MacroSummary> {
    let user_id = column(raw, USER_ID)?;
    let username = column(raw, USERNAME)?;
    let date = column(raw, DATE)?;
    let calories = column(raw, CALORIES)?;
    let protein = column(raw, PROTEIN)?;
    let carbs = column(raw, CARBS)?;
    let fats = column(raw, FATS)?;
    let meals = column(raw, MEALS)?;

    let mut groups: BTreeMap<(NaiveDate, i64, String), DailyMacroSummary> = BTreeMap::new();

    for (i, values) in rows(raw)? {
        let day = values[date]
            .as_date()
            .ok_or(AggregationError::InvalidDate { row: i, column: DATE })?;
        let id = match &values[user_id] {
            CellValue::Null => {
                return Err(AggregationError::NullValue { row: i, column: USER_ID });
            }
            cell => cell.as_i64().ok_or(AggregationError::NotNumeric {
                row: i,
                column: USER_ID,
            })?,
        };
        let name = match &values[username] {
            CellValue::Null => {
                return Err(AggregationError::NullValue { row: i, column: USERNAME });
            }
            CellValue::Text(s) => s.clone(),
            other => other.display_string(usize::MAX),
        };
        let meal_count = match &values[meals] {
            CellValue::Null => 0,
            cell => cell.as_i64().ok_or(AggregationError::NotNumeric {
                row: i,
                column: MEALS,
            })?,
        };

        let entry = groups
            .entry((day, id, name.clone()))
            .or_insert_with(|| DailyMacroSummary {
                user_id: id,
                username: name,
                date: day,
                total_calories: Decimal::ZERO,
                total_protein: Decimal::ZERO,
                total_carbs: Decimal::ZERO,
                total_fats: Decimal::ZERO,
                total_meals: 0,
            });
        entry.total_calories += amount(&values[calories], i, CALORIES)?;
        entry.total_protein += amount(&values[protein], i, PROTEIN)?;
        entry.total_carbs += amount(&values[carbs], i, CARBS)?;
        entry.total_fats += amount(&values[fats], i, FATS)?;
        entry.total_meals += meal_count;
    }

    let daily: Vec<DailyMacroSummary> = groups.into_values().collect();
    let latest = daily
        .iter()
        .map(|d| d.date)
        .max()
        .and_then(|max| daily.iter().find(|d| d.date == max))
        .cloned();

    Ok(MacroSummary { daily, latest })
}

//! Aggregation over rows decoded from real PostgreSQL types

use crate::common::acquire;
use chrono::NaiveDate;
use healthtrack::aggregate::{summarize_macros, summarize_weight};
use healthtrack::db::{Gateway, Statement};
use rust_decimal::Decimal;

const MACRO_ROWS: &str = "SELECT * FROM (VALUES \
     (1, 'alice', DATE '2024-01-01', 500.0, 30.0, 50.0, 10.0, 1), \
     (1, 'alice', DATE '2024-01-01', 700.0, 20.0, 70.0, 15.0, 1), \
     (1, 'alice', DATE '2023-12-31', 300.0, NULL, 40.0, NULL, 1) \
     ) AS t(user_id, username, date, total_calories, total_protein, \
            total_carbs, total_fats, total_meals)";

const WEIGHT_ROWS: &str = "SELECT * FROM (VALUES \
     (TIMESTAMP '2024-01-02 07:00', 180.0), \
     (TIMESTAMP '2024-01-01 07:00', 175.0) \
     ) AS t(date, user_weight)";

#[tokio::test]
async fn test_macros_from_numeric_columns() {
    let Some(handle) = acquire().await else {
        return;
    };
    let raw = handle
        .gateway()
        .execute(Statement::Query(MACRO_ROWS), &[])
        .await
        .unwrap();

    let summary = summarize_macros(&raw).unwrap();
    assert_eq!(summary.daily.len(), 2);

    let first = &summary.daily[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    assert_eq!(first.total_protein, Decimal::ZERO);

    let latest = summary.latest.unwrap();
    assert_eq!(latest.username, "alice");
    assert_eq!(latest.total_calories, Decimal::from(1200));
    assert_eq!(latest.total_protein, Decimal::from(50));
    assert_eq!(latest.total_carbs, Decimal::from(120));
    assert_eq!(latest.total_fats, Decimal::from(25));
    assert_eq!(latest.total_meals, 2);
}

#[tokio::test]
async fn test_weight_trend_from_timestamps() {
    let Some(handle) = acquire().await else {
        return;
    };
    let raw = handle
        .gateway()
        .execute(Statement::Query(WEIGHT_ROWS), &[])
        .await
        .unwrap();

    let weights: Vec<Decimal> = summarize_weight(&raw)
        .unwrap()
        .into_iter()
        .map(|p| p.weight)
        .collect();
    assert_eq!(weights, vec![Decimal::from(175), Decimal::from(180)]);
}

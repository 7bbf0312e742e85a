//! Meal items: foods added to an existing meal

use crate::db::{Gateway, RawResult, SqlParam, Statement};
use crate::error::DbResult;
use crate::services::{generated_id, result_code};
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

pub const ADD_MEAL_ITEM: &str = "sp_add_meal_item";

const ITEMS_FOR_MEAL: &str = "SELECT meal_item_id, meal_id, food_name, servings, \
     calories, protein, carbs, fats \
     FROM v_meal_item_details \
     WHERE username = $1 AND meal_id = $2 \
     ORDER BY meal_item_id";

const ITEMS_FOR_DAY: &str = "SELECT meal_item_id, meal_id, meal_type, meal_datetime, food_name, \
     servings, calories, protein, carbs, fats \
     FROM v_meal_item_details \
     WHERE username = $1 AND meal_datetime::date = $2 \
     ORDER BY meal_datetime, meal_item_id";

/// A food to add to a meal
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealItem {
    pub meal_id: i64,
    pub food_name: String,
    pub servings: f64,
}

/// Result of adding one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MealItemOutcome {
    Added { item_id: i64 },
    MealNotFound,
    FoodNotFound,
    Invalid { reason: ValidationError },
    Failed,
}

impl MealItemOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(-1) => MealItemOutcome::MealNotFound,
            Some(-2) => MealItemOutcome::FoodNotFound,
            other => match generated_id(other) {
                Some(item_id) => MealItemOutcome::Added { item_id },
                None => MealItemOutcome::Failed,
            },
        }
    }
}

pub struct MealItemService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> MealItemService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Add one food to a meal that already exists.
    ///
    /// Nothing is rolled back on failure: the meal stays, just without
    /// this item.
    pub async fn add_item(&self, item: &NewMealItem) -> DbResult<MealItemOutcome> {
        let checked = validation::required("food", &item.food_name)
            .and_then(|food| Ok((food, validation::positive("servings", item.servings)?)));
        let (food_name, servings) = match checked {
            Ok(fields) => fields,
            Err(reason) => return Ok(MealItemOutcome::Invalid { reason }),
        };

        let raw = self
            .gateway
            .execute(
                Statement::Procedure(ADD_MEAL_ITEM),
                &[item.meal_id.into(), food_name.into(), servings.into()],
            )
            .await?;
        let outcome = MealItemOutcome::from_code(result_code(&raw));
        tracing::debug!(meal_id = item.meal_id, food_name, ?outcome, "meal item add");
        Ok(outcome)
    }

    /// Items of one meal, scoped to its owner
    pub async fn items_for_meal(&self, username: &str, meal_id: i64) -> DbResult<RawResult> {
        self.gateway
            .execute(
                Statement::Query(ITEMS_FOR_MEAL),
                &[username.into(), meal_id.into()],
            )
            .await
    }

    /// Everything a user ate on one calendar day
    pub async fn items_for_day(&self, username: &str, day: NaiveDate) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(ITEMS_FOR_DAY), &[username.into(), SqlParam::Date(day)])
            .await
    }
}

//! Meals: the header record items hang off
//!
//! Creating a meal and filling it are separate calls with no transaction
//! between them. A meal whose items never arrive is still a valid meal;
//! [`MealService::detail`] shows it with an empty item list so it can be
//! completed later.

use crate::db::{Gateway, RawResult, Record, SqlParam, Statement};
use crate::error::DbResult;
use crate::services::meal_items::MealItemService;
use crate::services::{RECENT_LIMIT, generated_id, result_code};
use crate::validation::{self, ValidationError};
use chrono::NaiveDateTime;
use serde::Serialize;

pub const ADD_MEAL: &str = "sp_add_meal";

const MEAL_BY_ID: &str = "SELECT meal_id, username, meal_datetime, meal_type, notes \
     FROM v_user_meals WHERE username = $1 AND meal_id = $2";

const RECENT_MEALS: &str = "SELECT meal_id, meal_datetime, meal_type, notes \
     FROM v_user_meals WHERE username = $1 \
     ORDER BY meal_datetime DESC LIMIT $2";

/// Meal header as entered
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub meal_datetime: NaiveDateTime,
    pub meal_type: String,
    pub notes: String,
}

/// Result of creating a meal header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MealOutcome {
    Created { meal_id: i64 },
    Invalid { reason: ValidationError },
    Failed,
}

impl MealOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match generated_id(code) {
            Some(meal_id) => MealOutcome::Created { meal_id },
            None => MealOutcome::Failed,
        }
    }

    pub fn meal_id(&self) -> Option<i64> {
        match self {
            MealOutcome::Created { meal_id } => Some(*meal_id),
            _ => None,
        }
    }
}

/// A meal with whatever items it has so far
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealDetail {
    pub meal: Record,
    pub items: Vec<Record>,
}

pub struct MealService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> MealService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Create the meal header; items are added afterwards by id
    pub async fn create_meal(&self, username: &str, meal: &NewMeal) -> DbResult<MealOutcome> {
        let checked = validation::required("meal type", &meal.meal_type).and_then(|meal_type| {
            Ok((meal_type, validation::required("notes", &meal.notes)?))
        });
        let (meal_type, notes) = match checked {
            Ok(fields) => fields,
            Err(reason) => return Ok(MealOutcome::Invalid { reason }),
        };

        let raw = self
            .gateway
            .execute(
                Statement::Procedure(ADD_MEAL),
                &[
                    username.into(),
                    SqlParam::Timestamp(meal.meal_datetime),
                    meal_type.into(),
                    notes.into(),
                ],
            )
            .await?;
        let outcome = MealOutcome::from_code(result_code(&raw));
        tracing::debug!(username, ?outcome, "meal creation");
        Ok(outcome)
    }

    /// The meal row, if it exists and belongs to `username`
    pub async fn meal_by_id(&self, username: &str, meal_id: i64) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(MEAL_BY_ID), &[username.into(), meal_id.into()])
            .await
    }

    /// Latest meals first
    pub async fn recent_meals(&self, username: &str, limit: Option<i64>) -> DbResult<RawResult> {
        self.gateway
            .execute(
                Statement::Query(RECENT_MEALS),
                &[username.into(), limit.unwrap_or(RECENT_LIMIT).into()],
            )
            .await
    }

    /// Meal header plus items; `None` if the meal is not this user's
    pub async fn detail(&self, username: &str, meal_id: i64) -> DbResult<Option<MealDetail>> {
        let Some(meal) = self.meal_by_id(username, meal_id).await?.first_record() else {
            return Ok(None);
        };
        let items = MealItemService::new(self.gateway)
            .items_for_meal(username, meal_id)
            .await?
            .records();
        Ok(Some(MealDetail { meal, items }))
    }
}

//! Chart rows and the dashboard built from them

use crate::aggregate::{self, MacroSummary, WeightTrendPoint};
use crate::db::{Gateway, RawResult, Statement};
use crate::error::{DbResult, Result};
use serde::Serialize;

const CALORIES_PER_DAY: &str = "SELECT user_id, username, date, total_calories, \
     total_protein, total_carbs, total_fats, total_meals \
     FROM v_user_calories_per_day WHERE username = $1 \
     ORDER BY date";

const DAILY_WEIGHT: &str = "SELECT date, user_weight \
     FROM v_user_daily_weight WHERE username = $1 \
     ORDER BY date";

/// Everything the dashboard page shows for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub macros: MacroSummary,
    pub weight_trend: Vec<WeightTrendPoint>,
}

pub struct UserChartsService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> UserChartsService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// One row per meal-day with its totals, unaggregated
    pub async fn calories_per_day(&self, username: &str) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(CALORIES_PER_DAY), &[username.into()])
            .await
    }

    pub async fn daily_weight(&self, username: &str) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(DAILY_WEIGHT), &[username.into()])
            .await
    }

    /// Fetch both chart sources and summarize them
    pub async fn dashboard(&self, username: &str) -> Result<Dashboard> {
        let macros = aggregate::summarize_macros(&self.calories_per_day(username).await?)?;
        let weight_trend = aggregate::summarize_weight(&self.daily_weight(username).await?)?;
        tracing::debug!(
            username,
            days = macros.daily.len(),
            weigh_ins = weight_trend.len(),
            "dashboard assembled"
        );
        Ok(Dashboard {
            macros,
            weight_trend,
        })
    }
}

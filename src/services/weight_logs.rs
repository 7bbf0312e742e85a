//! Weigh-ins

use crate::db::{Gateway, RawResult, SqlParam, Statement};
use crate::error::DbResult;
use crate::services::{RECENT_LIMIT, generated_id, result_code};
use crate::validation::{self, ValidationError};
use chrono::NaiveDateTime;
use serde::Serialize;

pub const LOG_WEIGHT: &str = "sp_log_weight";

const RECENT_WEIGHTS: &str = "SELECT log_id, log_datetime, user_weight \
     FROM v_weight_logs WHERE username = $1 \
     ORDER BY log_datetime DESC LIMIT $2";

const WEIGHT_HISTORY: &str = "SELECT log_id, log_datetime, user_weight \
     FROM v_weight_logs WHERE username = $1 \
     ORDER BY log_datetime DESC";

#[derive(Debug, Clone, PartialEq)]
pub struct NewWeightLog {
    pub weight: f64,
    pub logged_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WeightLogOutcome {
    Logged { log_id: i64 },
    Invalid { reason: ValidationError },
    Failed,
}

impl WeightLogOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match generated_id(code) {
            Some(log_id) => WeightLogOutcome::Logged { log_id },
            None => WeightLogOutcome::Failed,
        }
    }
}

pub struct WeightLogService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> WeightLogService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Single insert; no lookups first
    pub async fn log_weight(&self, username: &str, entry: &NewWeightLog) -> DbResult<WeightLogOutcome> {
        let weight = match validation::positive("weight", entry.weight) {
            Ok(weight) => weight,
            Err(reason) => return Ok(WeightLogOutcome::Invalid { reason }),
        };

        let raw = self
            .gateway
            .execute(
                Statement::Procedure(LOG_WEIGHT),
                &[
                    username.into(),
                    weight.into(),
                    SqlParam::Timestamp(entry.logged_at),
                ],
            )
            .await?;
        let outcome = WeightLogOutcome::from_code(result_code(&raw));
        tracing::debug!(username, ?outcome, "weight log");
        Ok(outcome)
    }

    pub async fn recent(&self, username: &str, limit: Option<i64>) -> DbResult<RawResult> {
        self.gateway
            .execute(
                Statement::Query(RECENT_WEIGHTS),
                &[username.into(), limit.unwrap_or(RECENT_LIMIT).into()],
            )
            .await
    }

    pub async fn history(&self, username: &str) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(WEIGHT_HISTORY), &[username.into()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::scripted::{ScriptedGateway, raw};
    use chrono::NaiveDate;

    fn morning(weight: f64) -> NewWeightLog {
        NewWeightLog {
            weight,
            logged_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_log_weight() {
        let gateway = ScriptedGateway::new().code(12);
        let outcome = WeightLogService::new(&gateway)
            .log_weight("alice", &morning(72.4))
            .await
            .unwrap();
        assert_eq!(outcome, WeightLogOutcome::Logged { log_id: 12 });
        assert_eq!(gateway.calls()[0].params[1], SqlParam::Float(72.4));
    }

    #[tokio::test]
    async fn test_zero_weight_never_reaches_store() {
        let gateway = ScriptedGateway::new();
        let outcome = WeightLogService::new(&gateway)
            .log_weight("alice", &morning(0.0))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WeightLogOutcome::Invalid {
                reason: ValidationError::NotPositive("weight")
            }
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_negative_code_is_failure() {
        let gateway = ScriptedGateway::new().code(-1);
        let outcome = WeightLogService::new(&gateway)
            .log_weight("alice", &morning(70.0))
            .await
            .unwrap();
        assert_eq!(outcome, WeightLogOutcome::Failed);
    }

    #[tokio::test]
    async fn test_recent_with_explicit_limit() {
        let gateway = ScriptedGateway::new().reply(raw(&["log_id"], vec![]));
        WeightLogService::new(&gateway)
            .recent("alice", Some(3))
            .await
            .unwrap();
        assert_eq!(gateway.calls()[0].params[1], SqlParam::Int(3));
    }
}

//! Exercise catalogue

use crate::db::{Gateway, RawResult, Record, Statement};
use crate::error::DbResult;

const ALL_EXERCISES: &str = "SELECT exercise_id, exercise_name, category \
     FROM exercises ORDER BY exercise_name";

const EXERCISE_BY_NAME: &str = "SELECT exercise_id, exercise_name, category \
     FROM exercises WHERE exercise_name = $1";

pub struct ExerciseService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> ExerciseService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    pub async fn all_exercises(&self) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(ALL_EXERCISES), &[])
            .await
    }

    /// Exact-name lookup. Exercises are never created on the fly.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Record>> {
        let raw = self
            .gateway
            .execute(Statement::Query(EXERCISE_BY_NAME), &[name.into()])
            .await?;
        Ok(raw.first_record())
    }
}

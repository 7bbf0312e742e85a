//! Workout sessions
//!
//! Logging is two calls: the exercise must already exist in the catalogue,
//! then the session row is inserted against it.

use crate::db::{Gateway, RawResult, SqlParam, Statement};
use crate::error::DbResult;
use crate::services::exercises::ExerciseService;
use crate::services::{RECENT_LIMIT, generated_id, result_code};
use crate::validation::{self, ValidationError};
use chrono::NaiveDateTime;
use serde::Serialize;

pub const ADD_WORKOUT_SESSION: &str = "sp_add_workout_session";

const RECENT_SESSIONS: &str = "SELECT session_id, exercise_name, session_datetime, \
     duration_minutes, sets, reps, weight, notes \
     FROM v_workout_sessions WHERE username = $1 \
     ORDER BY session_datetime DESC LIMIT $2";

const SESSION_HISTORY: &str = "SELECT session_id, exercise_name, session_datetime, \
     duration_minutes, sets, reps, weight, notes \
     FROM v_workout_sessions WHERE username = $1 \
     ORDER BY session_datetime DESC";

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub exercise: String,
    pub session_datetime: NaiveDateTime,
    pub duration_minutes: i32,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub notes: Option<String>,
}

impl NewWorkout {
    fn validate(&self) -> Result<&str, ValidationError> {
        let exercise = validation::required("exercise", &self.exercise)?;
        validation::non_negative("duration", f64::from(self.duration_minutes))?;
        validation::non_negative("sets", f64::from(self.sets))?;
        validation::non_negative("reps", f64::from(self.reps))?;
        validation::non_negative("weight", self.weight)?;
        Ok(exercise)
    }
}

/// Result of logging one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkoutOutcome {
    Logged { session_id: i64 },
    UnknownExercise { name: String },
    Invalid { reason: ValidationError },
    Failed,
}

impl WorkoutOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match generated_id(code) {
            Some(session_id) => WorkoutOutcome::Logged { session_id },
            None => WorkoutOutcome::Failed,
        }
    }
}

pub struct WorkoutSessionService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> WorkoutSessionService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Validate, confirm the exercise exists, then insert the session.
    ///
    /// An unknown exercise stops the workflow without a retry or an
    /// insert into the catalogue.
    pub async fn log_session(&self, username: &str, workout: &NewWorkout) -> DbResult<WorkoutOutcome> {
        let exercise = match workout.validate() {
            Ok(exercise) => exercise,
            Err(reason) => return Ok(WorkoutOutcome::Invalid { reason }),
        };

        if ExerciseService::new(self.gateway)
            .find_by_name(exercise)
            .await?
            .is_none()
        {
            tracing::info!(username, exercise, "workout rejected, unknown exercise");
            return Ok(WorkoutOutcome::UnknownExercise {
                name: exercise.to_string(),
            });
        }

        let notes = workout
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let raw = self
            .gateway
            .execute(
                Statement::Procedure(ADD_WORKOUT_SESSION),
                &[
                    username.into(),
                    exercise.into(),
                    SqlParam::Timestamp(workout.session_datetime),
                    workout.duration_minutes.into(),
                    workout.sets.into(),
                    workout.reps.into(),
                    workout.weight.into(),
                    notes.into(),
                ],
            )
            .await?;
        let outcome = WorkoutOutcome::from_code(result_code(&raw));
        tracing::debug!(username, exercise, ?outcome, "workout session");
        Ok(outcome)
    }

    pub async fn recent(&self, username: &str, limit: Option<i64>) -> DbResult<RawResult> {
        self.gateway
            .execute(
                Statement::Query(RECENT_SESSIONS),
                &[username.into(), limit.unwrap_or(RECENT_LIMIT).into()],
            )
            .await
    }

    /// Every session, newest first
    pub async fn history(&self, username: &str) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(SESSION_HISTORY), &[username.into()])
            .await
    }
}

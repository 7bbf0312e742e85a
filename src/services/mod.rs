//! Domain services
//!
//! One service per entity, each borrowing the request's [`Gateway`].
//! Read operations hand back raw rows; write operations call a procedure
//! and translate its result code into that procedure's own outcome enum
//! right here, so no bare integer leaves this module.
//!
//! Procedure code spaces are not shared: `-1` means "username taken" to
//! account creation, "email not found" to password reset and "user not
//! found" to account deletion.
//!
//! [`Gateway`]: crate::db::Gateway

pub mod charts;
pub mod exercises;
pub mod foods;
pub mod meal_items;
pub mod meals;
pub mod users;
pub mod weight_logs;
pub mod workouts;

pub use charts::{Dashboard, UserChartsService};
pub use exercises::ExerciseService;
pub use foods::FoodService;
pub use meal_items::{MealItemOutcome, MealItemService, NewMealItem};
pub use meals::{MealDetail, MealOutcome, MealService, NewMeal};
pub use users::{
    AuthOutcome, DeleteAccountOutcome, NewAccount, ResetPasswordOutcome, SignupOutcome,
    UserService,
};
pub use weight_logs::{NewWeightLog, WeightLogOutcome, WeightLogService};
pub use workouts::{NewWorkout, WorkoutOutcome, WorkoutSessionService};

use crate::db::RawResult;

/// Default page size for the "recent" list views
pub const RECENT_LIMIT: i64 = 10;

/// Row 0, column 0 as a whole number.
///
/// No rows, an empty row, NULL and non-integers all come back as `None`,
/// which every interpreter treats as a failure.
pub(crate) fn result_code(raw: &RawResult) -> Option<i64> {
    raw.first_cell().and_then(|cell| cell.as_i64())
}

/// The common "positive id or failure" procedure shape
pub(crate) fn generated_id(code: Option<i64>) -> Option<i64> {
    code.filter(|id| *id > 0)
}

//! healthtrack - command-line front end
//!
//! Each invocation is one request: load settings, snapshot the database
//! login, acquire a single connection, run one workflow, print its result
//! as JSON on stdout.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use healthtrack::config::load_settings;
use healthtrack::db::{ActionGateway, ConnectionManager};
use healthtrack::logging::init_logging;
use healthtrack::services::{
    MealItemService, MealService, NewAccount, NewMeal, NewMealItem, NewWeightLog, NewWorkout,
    UserChartsService, UserService, WeightLogService, WorkoutSessionService,
};
use healthtrack::session::SessionState;
use healthtrack::validation::{self, ValidationError};
use serde::Serialize;
use std::io::Write;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database login (not the app user)
    #[arg(long, env = "HEALTHTRACK_DB_USER", global = true)]
    db_user: Option<String>,

    /// Database password
    #[arg(long, env = "HEALTHTRACK_DB_PASSWORD", global = true, hide_env_values = true)]
    db_password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test the database login
    Connect,

    /// Check an app username and password
    Signin { username: String, password: String },

    /// Create an app account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        height: String,
        #[arg(long)]
        weight: String,
    },

    /// Set a new password for an email/username pair
    ResetPassword {
        email: String,
        username: String,
        new_password: String,
    },

    /// Delete an account permanently
    DeleteAccount {
        username: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Macro summary and weight trend
    Dashboard { username: String },

    /// Record a weigh-in
    LogWeight {
        username: String,
        weight: String,
        /// When, YYYY-MM-DDTHH:MM (default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a workout session
    LogWorkout {
        username: String,
        exercise: String,
        #[arg(long, default_value = "0")]
        duration: String,
        #[arg(long, default_value = "0")]
        sets: String,
        #[arg(long, default_value = "0")]
        reps: String,
        #[arg(long, default_value = "0")]
        weight: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        at: Option<String>,
    },

    /// Create an empty meal
    CreateMeal {
        username: String,
        meal_type: String,
        notes: String,
        #[arg(long)]
        at: Option<String>,
    },

    /// Add a food to an existing meal
    AddMealItem {
        meal_id: i64,
        food: String,
        servings: String,
    },

    /// A meal with its items
    Meal { username: String, meal_id: i64 },

    /// Recent or full history
    History {
        username: String,
        #[arg(value_enum)]
        kind: HistoryKind,
        #[arg(long)]
        limit: Option<i64>,
        /// Everything, not just the latest entries
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HistoryKind {
    Meals,
    Workouts,
    Weight,
}

/// Printed when an argument fails to parse before any service runs
#[derive(Serialize)]
#[serde(tag = "outcome", rename = "invalid")]
struct Rejected {
    reason: ValidationError,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings().context("Failed to load settings")?;
    init_logging(&settings.logging)?;

    let manager = ConnectionManager::new(settings.database);
    let mut session = match (&cli.db_user, &cli.db_password) {
        (Some(user), Some(pass)) => SessionState::connected(user.as_str(), pass.as_str()),
        _ => SessionState::new(),
    };

    if let Commands::Connect = cli.command {
        let user = cli.db_user.as_deref().unwrap_or_default();
        let pass = cli.db_password.as_deref().unwrap_or_default();
        manager.connect_and_test(&mut session, user, pass).await?;
        return emit(&serde_json::json!({ "connected": true, "db_user": session.db_user() }));
    }

    let handle = manager
        .acquire_for(&session)
        .await
        .context("Could not open a database connection")?;
    let gateway = handle.gateway();
    run(cli.command, &gateway, &mut session).await
}

async fn run(command: Commands, gateway: &ActionGateway<'_>, session: &mut SessionState) -> Result<()> {
    match command {
        Commands::Connect => Ok(()),

        Commands::Signin { username, password } => {
            emit(&UserService::new(gateway).authenticate(&username, &password).await?)
        }

        Commands::Signup {
            first_name,
            last_name,
            username,
            email,
            password,
            dob,
            gender,
            height,
            weight,
        } => {
            let parsed = validation::parse_date("date of birth", &dob).and_then(|dob| {
                Ok((
                    dob,
                    validation::parse_number("height", &height)?,
                    validation::parse_number("weight", &weight)?,
                ))
            });
            let (dob, height, weight) = match parsed {
                Ok(values) => values,
                Err(reason) => return emit(&Rejected { reason }),
            };
            let account = NewAccount {
                first_name,
                last_name,
                username,
                email,
                password,
                dob,
                gender,
                height,
                weight,
            };
            emit(&UserService::new(gateway).create_account(&account).await?)
        }

        Commands::ResetPassword {
            email,
            username,
            new_password,
        } => emit(
            &UserService::new(gateway)
                .reset_password(&email, &username, &new_password)
                .await?,
        ),

        Commands::DeleteAccount { username, yes } => {
            let outcome = UserService::new(gateway).delete_account(&username, yes).await?;
            if outcome.is_deleted() {
                session.clear();
            }
            emit(&outcome)
        }

        Commands::Dashboard { username } => {
            emit(&UserChartsService::new(gateway).dashboard(&username).await?)
        }

        Commands::LogWeight {
            username,
            weight,
            at,
        } => {
            let parsed = validation::parse_number("weight", &weight)
                .and_then(|weight| Ok((weight, when(at.as_deref())?)));
            let (weight, logged_at) = match parsed {
                Ok(values) => values,
                Err(reason) => return emit(&Rejected { reason }),
            };
            let entry = NewWeightLog { weight, logged_at };
            emit(&WeightLogService::new(gateway).log_weight(&username, &entry).await?)
        }

        Commands::LogWorkout {
            username,
            exercise,
            duration,
            sets,
            reps,
            weight,
            notes,
            at,
        } => {
            let parsed = (|| {
                Ok::<_, ValidationError>(NewWorkout {
                    exercise,
                    session_datetime: when(at.as_deref())?,
                    duration_minutes: validation::parse_count("duration", &duration)?,
                    sets: validation::parse_count("sets", &sets)?,
                    reps: validation::parse_count("reps", &reps)?,
                    weight: validation::parse_number("weight", &weight)?,
                    notes,
                })
            })();
            let workout = match parsed {
                Ok(workout) => workout,
                Err(reason) => return emit(&Rejected { reason }),
            };
            emit(
                &WorkoutSessionService::new(gateway)
                    .log_session(&username, &workout)
                    .await?,
            )
        }

        Commands::CreateMeal {
            username,
            meal_type,
            notes,
            at,
        } => {
            let meal_datetime = match when(at.as_deref()) {
                Ok(at) => at,
                Err(reason) => return emit(&Rejected { reason }),
            };
            let meal = NewMeal {
                meal_datetime,
                meal_type,
                notes,
            };
            emit(&MealService::new(gateway).create_meal(&username, &meal).await?)
        }

        Commands::AddMealItem {
            meal_id,
            food,
            servings,
        } => {
            let servings = match validation::parse_number("servings", &servings) {
                Ok(servings) => servings,
                Err(reason) => return emit(&Rejected { reason }),
            };
            let item = NewMealItem {
                meal_id,
                food_name: food,
                servings,
            };
            emit(&MealItemService::new(gateway).add_item(&item).await?)
        }

        Commands::Meal { username, meal_id } => {
            match MealService::new(gateway).detail(&username, meal_id).await? {
                Some(detail) => emit(&detail),
                None => emit(&serde_json::Value::Null),
            }
        }

        Commands::History {
            username,
            kind,
            limit,
            all,
        } => {
            let rows = match (kind, all) {
                (HistoryKind::Meals, _) => {
                    let limit = if all { Some(i64::MAX) } else { limit };
                    MealService::new(gateway).recent_meals(&username, limit).await?
                }
                (HistoryKind::Workouts, true) => {
                    WorkoutSessionService::new(gateway).history(&username).await?
                }
                (HistoryKind::Workouts, false) => {
                    WorkoutSessionService::new(gateway)
                        .recent(&username, limit)
                        .await?
                }
                (HistoryKind::Weight, true) => WeightLogService::new(gateway).history(&username).await?,
                (HistoryKind::Weight, false) => {
                    WeightLogService::new(gateway).recent(&username, limit).await?
                }
            };
            emit(&rows.records())
        }
    }
}

/// `--at` if given, otherwise the local time now
fn when(at: Option<&str>) -> Result<NaiveDateTime, ValidationError> {
    match at {
        Some(raw) => validation::parse_datetime("date/time", raw),
        None => Ok(Local::now().naive_local()),
    }
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

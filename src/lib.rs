//! healthtrack - data core of a personal health-tracking backend
//!
//! Users sign up, sign in, log meals, workouts and weigh-ins, and view a
//! dashboard of derived summaries. This crate is everything between the
//! request handler and PostgreSQL:
//!
//! - **Connections**: one connection per request, opened with the session's
//!   own database login and closed when the request ends
//! - **Gateway**: every query or stored-procedure call returns raw rows
//!   plus column names
//! - **Services**: one per entity; stored-procedure result codes become
//!   typed outcomes at the service boundary
//! - **Aggregation**: chart rows become per-day macro totals and a sorted
//!   weight trend
//!
//! # Architecture
//!
//! - [`config`]: database target and settings
//! - [`session`]: session credentials and the per-request auth context
//! - [`db`]: connection manager, gateway and raw result types
//! - [`services`]: domain services and their outcome enums
//! - [`aggregate`]: dashboard summaries
//! - [`validation`]: input checks run before any store call
//! - [`logging`]: subscriber setup for the binary
//! - [`error`]: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use healthtrack::config::DatabaseTarget;
//! use healthtrack::db::ConnectionManager;
//! use healthtrack::services::{AuthOutcome, UserChartsService, UserService};
//! use healthtrack::session::SessionState;
//!
//! # async fn example() -> healthtrack::Result<()> {
//! let manager = ConnectionManager::new(DatabaseTarget::default());
//! let mut session = SessionState::new();
//! manager.connect_and_test(&mut session, "app_user", "secret").await?;
//!
//! // Per request: acquire, use, drop
//! let handle = manager.acquire_for(&session).await?;
//! let gateway = handle.gateway();
//! if UserService::new(&gateway).authenticate("alice", "pw").await? == AuthOutcome::Authenticated {
//!     let dashboard = UserChartsService::new(&gateway).dashboard("alice").await?;
//!     println!("{} days logged", dashboard.macros.daily.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod session;
pub mod validation;

pub use error::{AggregationError, ConfigError, DbError, HealthError, Result};

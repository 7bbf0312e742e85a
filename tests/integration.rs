//! Integration test runner
//!
//! These tests talk to a real PostgreSQL server and skip themselves when
//! none is reachable.
//!
//! Environment variables (with defaults):
//! - TEST_DB_HOST: localhost
//! - TEST_DB_PORT: 5433
//! - TEST_DB_NAME: test_db
//! - TEST_DB_USER: test_user
//! - TEST_DB_PASSWORD: test_password

mod common;

#[path = "integration/connection_manager.rs"]
mod connection_manager;

#[path = "integration/gateway_calls.rs"]
mod gateway_calls;

#[path = "integration/dashboard_pipeline.rs"]
mod dashboard_pipeline;

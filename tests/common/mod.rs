//! Shared helpers for the integration tests

use healthtrack::config::{DatabaseTarget, SslMode};
use healthtrack::db::{ConnectionHandle, ConnectionManager};
use healthtrack::session::SessionState;

pub fn test_target() -> DatabaseTarget {
    DatabaseTarget {
        host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("TEST_DB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5433),
        name: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "test_db".to_string()),
        ssl_mode: SslMode::Disable,
    }
}

pub fn test_credentials() -> (String, String) {
    (
        std::env::var("TEST_DB_USER").unwrap_or_else(|_| "test_user".to_string()),
        std::env::var("TEST_DB_PASSWORD").unwrap_or_else(|_| "test_password".to_string()),
    )
}

/// A connected session, or `None` (with a note on stderr) when the test
/// database is not running
pub async fn connected_session() -> Option<(ConnectionManager, SessionState)> {
    let manager = ConnectionManager::new(test_target());
    let mut session = SessionState::new();
    let (user, pass) = test_credentials();
    match manager.connect_and_test(&mut session, &user, &pass).await {
        Ok(()) => Some((manager, session)),
        Err(e) => {
            let target = manager.target();
            eprintln!(
                "Skipping test: database not available at {}:{} - {}",
                target.host, target.port, e
            );
            None
        }
    }
}

/// One request's connection, or `None` when the database is not running
pub async fn acquire() -> Option<ConnectionHandle> {
    let (manager, session) = connected_session().await?;
    manager.acquire_for(&session).await.ok()
}

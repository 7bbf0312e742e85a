//! Connection manager
//!
//! Opens one fresh connection per request from the caller's
//! [`AuthContext`]. Nothing is pooled: a [`ConnectionHandle`] lives for one
//! request and closes when it goes out of scope, on success and error
//! paths alike.

use crate::config::DatabaseTarget;
use crate::db::gateway::{Gateway, Statement};
use crate::db::params::SqlParam;
use crate::db::postgres::PostgresConnection;
use crate::db::types::RawResult;
use crate::error::{DbError, DbResult};
use crate::session::{AuthContext, SessionState};

/// Opens request-scoped connections to a fixed database target
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    target: DatabaseTarget,
}

impl ConnectionManager {
    pub fn new(target: DatabaseTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    /// Open a new connection for this request.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionFailed` if the login is rejected or the
    /// server is unreachable
    pub async fn acquire(&self, auth: &AuthContext) -> DbResult<ConnectionHandle> {
        let connection = PostgresConnection::connect(&self.target, auth).await?;
        tracing::debug!(db_user = auth.db_user(), "connection acquired");
        Ok(ConnectionHandle {
            connection,
            db_user: auth.db_user().to_string(),
        })
    }

    /// Snapshot the session and open a connection in one step.
    ///
    /// # Errors
    /// Returns `DbError::NotConnected` if the session never connected,
    /// otherwise as [`acquire`](Self::acquire)
    pub async fn acquire_for(&self, session: &SessionState) -> DbResult<ConnectionHandle> {
        let auth = session.auth_context()?;
        self.acquire(&auth).await
    }

    /// Probe a login and record it in the session if it works.
    ///
    /// Blank credentials are rejected without touching the network. On any
    /// failure the session's connected flag, user and password are all
    /// cleared, so no half-connected state survives.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionFailed` when the probe fails
    pub async fn connect_and_test(
        &self,
        session: &mut SessionState,
        db_user: &str,
        db_pass: &str,
    ) -> DbResult<()> {
        let db_user = db_user.trim();
        if db_user.is_empty() || db_pass.is_empty() {
            session.clear();
            return Err(DbError::ConnectionFailed(
                "Username and password required".to_string(),
            ));
        }

        let candidate = SessionState::connected(db_user, db_pass);
        let auth = candidate.auth_context()?;

        let probe = match self.acquire(&auth).await {
            Ok(handle) => {
                if handle.is_connected().await {
                    Ok(())
                } else {
                    Err(DbError::ConnectionFailed(
                        "connection closed during status check".to_string(),
                    ))
                }
            }
            Err(e) => Err(e),
        };

        match probe {
            Ok(()) => {
                session.store(db_user.to_string(), db_pass.to_string());
                tracing::info!(db_user, "database credentials accepted");
                Ok(())
            }
            Err(e) => {
                session.clear();
                tracing::warn!(db_user, error = %e, "database credentials rejected");
                Err(match e {
                    DbError::ConnectionFailed(_) => e,
                    other => DbError::ConnectionFailed(other.to_string()),
                })
            }
        }
    }
}

/// A live connection owned by exactly one request
///
/// Not `Clone`; dropping it closes the connection.
pub struct ConnectionHandle {
    connection: PostgresConnection,
    db_user: String,
}

impl ConnectionHandle {
    /// Gateway bound to this handle
    pub fn gateway(&self) -> ActionGateway<'_> {
        ActionGateway { handle: self }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// Release the connection now instead of at end of scope
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        tracing::debug!(db_user = %self.db_user, "connection released");
    }
}

/// Executes statements over one [`ConnectionHandle`]
pub struct ActionGateway<'a> {
    handle: &'a ConnectionHandle,
}

impl Gateway for ActionGateway<'_> {
    async fn execute(&self, statement: Statement<'_>, params: &[SqlParam]) -> DbResult<RawResult> {
        let sql = statement.to_sql(params.len())?;
        let result = self.handle.connection.execute(&sql, params).await;
        match &result {
            Ok(raw) => tracing::debug!(
                statement = statement.label(),
                rows = raw.row_count(),
                elapsed_ms = raw.execution_time.as_millis() as u64,
                "statement executed"
            ),
            Err(e) => tracing::warn!(statement = statement.label(), error = %e, "statement failed"),
        }
        result
    }
}

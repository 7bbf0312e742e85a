//! Session credentials and the per-request auth context
//!
//! [`SessionState`] is the caller-owned record of whether this session has
//! connected and with which database login. It only changes through
//! [`ConnectionManager::connect_and_test`](crate::db::ConnectionManager::connect_and_test),
//! logout and account deletion.
//!
//! Each request snapshots it once into an immutable [`AuthContext`], which is
//! all the connection manager ever sees.

use crate::error::{DbError, DbResult};
use std::fmt;

/// Caller-owned connection state for one user's session
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    connected: bool,
    db_user: Option<String>,
    db_pass: Option<String>,
}

impl SessionState {
    /// A fresh, disconnected session
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a session whose credentials were already tested
    pub fn connected(db_user: impl Into<String>, db_pass: impl Into<String>) -> Self {
        Self {
            connected: true,
            db_user: Some(db_user.into()),
            db_pass: Some(db_pass.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn db_user(&self) -> Option<&str> {
        self.db_user.as_deref()
    }

    /// Record credentials that just passed a connection test
    pub(crate) fn store(&mut self, db_user: String, db_pass: String) {
        self.connected = true;
        self.db_user = Some(db_user);
        self.db_pass = Some(db_pass);
    }

    /// Drop the connected flag, user and password together.
    ///
    /// Used on logout, account deletion and failed reconnection.
    pub fn clear(&mut self) {
        self.connected = false;
        self.db_user = None;
        self.db_pass = None;
    }

    /// Snapshot the credentials for one request.
    ///
    /// # Errors
    /// Returns `DbError::NotConnected` if the session never connected, or
    /// if its credentials are incomplete. Callers should send the user to
    /// the connect step instead of retrying.
    pub fn auth_context(&self) -> DbResult<AuthContext> {
        match (self.connected, &self.db_user, &self.db_pass) {
            (true, Some(user), Some(pass)) => Ok(AuthContext {
                db_user: user.clone(),
                db_pass: pass.clone(),
            }),
            _ => Err(DbError::NotConnected),
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("connected", &self.connected)
            .field("db_user", &self.db_user)
            .field("db_pass", &self.db_pass.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Immutable credentials for a single request
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    db_user: String,
    db_pass: String,
}

impl AuthContext {
    pub fn db_user(&self) -> &str {
        &self.db_user
    }

    pub(crate) fn db_password(&self) -> &str {
        &self.db_pass
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("db_user", &self.db_user)
            .field("db_pass", &"<redacted>")
            .finish()
    }
}

//! User accounts: sign-in, sign-up, password reset, deletion

use crate::db::{Gateway, RawResult, SqlParam, Statement};
use crate::error::{DbError, DbResult};
use crate::services::{generated_id, result_code};
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

pub const AUTHENTICATE_USER: &str = "sp_authenticate_user";
pub const ADD_USER: &str = "sp_add_user";
pub const RESET_USER_PASSWORD: &str = "sp_reset_user_password";
pub const DELETE_USER: &str = "sp_delete_user";

const ACCOUNT_BY_USERNAME: &str = "SELECT user_id, username, email, first_name, last_name, \
     dob, gender, height, weight \
     FROM v_user_accounts WHERE username = $1";

/// Result of checking a username/password pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthOutcome {
    Authenticated,
    /// Unknown user and wrong password look the same on purpose
    InvalidCredentials,
}

impl AuthOutcome {
    /// `0` is the only success code
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => AuthOutcome::Authenticated,
            _ => AuthOutcome::InvalidCredentials,
        }
    }
}

/// Result of creating an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignupOutcome {
    Created { user_id: i64 },
    UsernameTaken,
    EmailTaken,
    Invalid { reason: ValidationError },
    Failed,
}

impl SignupOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(-1) => SignupOutcome::UsernameTaken,
            Some(-2) => SignupOutcome::EmailTaken,
            other => match generated_id(other) {
                Some(user_id) => SignupOutcome::Created { user_id },
                None => SignupOutcome::Failed,
            },
        }
    }
}

/// Result of resetting a forgotten password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResetPasswordOutcome {
    Reset,
    EmailNotFound,
    UserNotFound,
    EmailUsernameMismatch,
    Invalid { reason: ValidationError },
    Failed,
}

impl ResetPasswordOutcome {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => ResetPasswordOutcome::Reset,
            Some(-1) => ResetPasswordOutcome::EmailNotFound,
            Some(-2) => ResetPasswordOutcome::UserNotFound,
            Some(-3) => ResetPasswordOutcome::EmailUsernameMismatch,
            _ => ResetPasswordOutcome::Failed,
        }
    }
}

/// Result of deleting an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteAccountOutcome {
    Deleted,
    UserNotFound,
    Invalid { reason: ValidationError },
    Failed,
}

impl DeleteAccountOutcome {
    /// Only `0` deletes; `1` and anything else are not taken as success
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => DeleteAccountOutcome::Deleted,
            Some(-1) => DeleteAccountOutcome::UserNotFound,
            _ => DeleteAccountOutcome::Failed,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteAccountOutcome::Deleted)
    }
}

/// Sign-up form contents
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
}

impl NewAccount {
    /// Every field present, height and weight above zero, plausible email
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("first name", &self.first_name)?;
        validation::required("last name", &self.last_name)?;
        validation::required("username", &self.username)?;
        validation::email(&self.email)?;
        validation::required("password", &self.password)?;
        validation::required("gender", &self.gender)?;
        validation::positive("height", self.height)?;
        validation::positive("weight", self.weight)?;
        Ok(())
    }

    fn params(&self) -> Vec<SqlParam> {
        vec![
            self.first_name.trim().into(),
            self.last_name.trim().into(),
            self.email.trim().into(),
            self.password.trim().into(),
            self.username.trim().into(),
            self.dob.into(),
            self.gender.trim().into(),
            self.height.into(),
            self.weight.into(),
        ]
    }
}

/// Account procedures and lookups for one request
pub struct UserService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> UserService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Check a username/password pair.
    ///
    /// Blank input is rejected without a store call. A procedure that
    /// raises (as some stores do for unknown users) also reads as invalid
    /// credentials; connection-level failures still propagate.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<AuthOutcome> {
        let (Ok(username), Ok(password)) = (
            validation::required("username", username),
            validation::required("password", password),
        ) else {
            return Ok(AuthOutcome::InvalidCredentials);
        };

        let result = self
            .gateway
            .execute(
                Statement::Procedure(AUTHENTICATE_USER),
                &[username.into(), password.into()],
            )
            .await;

        let outcome = match result {
            Ok(raw) => AuthOutcome::from_code(result_code(&raw)),
            Err(DbError::QueryFailed(e)) => {
                tracing::warn!(username, error = %e, "authentication procedure failed");
                AuthOutcome::InvalidCredentials
            }
            Err(e) => return Err(e),
        };

        if outcome == AuthOutcome::InvalidCredentials {
            tracing::info!(username, "sign-in rejected");
        }
        Ok(outcome)
    }

    /// Create an account
    pub async fn create_account(&self, account: &NewAccount) -> DbResult<SignupOutcome> {
        if let Err(reason) = account.validate() {
            return Ok(SignupOutcome::Invalid { reason });
        }

        let raw = self
            .gateway
            .execute(Statement::Procedure(ADD_USER), &account.params())
            .await?;
        let outcome = SignupOutcome::from_code(result_code(&raw));
        tracing::debug!(username = account.username.trim(), ?outcome, "account creation");
        Ok(outcome)
    }

    /// Set a new password after matching email and username
    pub async fn reset_password(
        &self,
        email: &str,
        username: &str,
        new_password: &str,
    ) -> DbResult<ResetPasswordOutcome> {
        let checked = validation::required("email", email).and_then(|email| {
            let username = validation::required("username", username)?;
            let password = validation::required("new password", new_password)?;
            Ok((email, username, password))
        });
        let (email, username, password) = match checked {
            Ok(fields) => fields,
            Err(reason) => return Ok(ResetPasswordOutcome::Invalid { reason }),
        };

        let raw = self
            .gateway
            .execute(
                Statement::Procedure(RESET_USER_PASSWORD),
                &[email.into(), password.into(), username.into()],
            )
            .await?;
        let outcome = ResetPasswordOutcome::from_code(result_code(&raw));
        tracing::debug!(username, ?outcome, "password reset");
        Ok(outcome)
    }

    /// Delete the signed-in user's account.
    ///
    /// `confirmed` is the user's explicit "yes, delete" answer. When the
    /// outcome is `Deleted` the caller must also clear its session.
    pub async fn delete_account(
        &self,
        username: &str,
        confirmed: bool,
    ) -> DbResult<DeleteAccountOutcome> {
        let username = match validation::required("username", username) {
            Ok(username) => username,
            Err(reason) => return Ok(DeleteAccountOutcome::Invalid { reason }),
        };
        if !confirmed {
            return Ok(DeleteAccountOutcome::Invalid {
                reason: ValidationError::NotConfirmed,
            });
        }

        let raw = self
            .gateway
            .execute(Statement::Procedure(DELETE_USER), &[username.into()])
            .await?;
        let outcome = DeleteAccountOutcome::from_code(result_code(&raw));
        tracing::info!(username, ?outcome, "account deletion");
        Ok(outcome)
    }

    /// Profile row for a username (empty if unknown)
    pub async fn account(&self, username: &str) -> DbResult<RawResult> {
        self.gateway
            .execute(Statement::Query(ACCOUNT_BY_USERNAME), &[username.into()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CellValue;
    use crate::db::scripted::{ScriptedGateway, raw};

    fn account() -> NewAccount {
        NewAccount {
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "wonderland".into(),
            dob: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            gender: "F".into(),
            height: 165.0,
            weight: 60.5,
        }
    }

    #[test]
    fn test_auth_codes() {
        assert_eq!(AuthOutcome::from_code(Some(0)), AuthOutcome::Authenticated);
        for code in [Some(1), Some(-1), Some(42), None] {
            assert_eq!(AuthOutcome::from_code(code), AuthOutcome::InvalidCredentials);
        }
    }

    #[test]
    fn test_signup_codes() {
        assert_eq!(SignupOutcome::from_code(Some(7)), SignupOutcome::Created { user_id: 7 });
        assert_eq!(SignupOutcome::from_code(Some(-1)), SignupOutcome::UsernameTaken);
        assert_eq!(SignupOutcome::from_code(Some(-2)), SignupOutcome::EmailTaken);
        for code in [Some(0), Some(-3), Some(-99), None] {
            assert_eq!(SignupOutcome::from_code(code), SignupOutcome::Failed);
        }
    }

    #[test]
    fn test_reset_codes() {
        assert_eq!(ResetPasswordOutcome::from_code(Some(0)), ResetPasswordOutcome::Reset);
        assert_eq!(
            ResetPasswordOutcome::from_code(Some(-1)),
            ResetPasswordOutcome::EmailNotFound
        );
        assert_eq!(
            ResetPasswordOutcome::from_code(Some(-2)),
            ResetPasswordOutcome::UserNotFound
        );
        assert_eq!(
            ResetPasswordOutcome::from_code(Some(-3)),
            ResetPasswordOutcome::EmailUsernameMismatch
        );
        assert_eq!(ResetPasswordOutcome::from_code(Some(1)), ResetPasswordOutcome::Failed);
        assert_eq!(ResetPasswordOutcome::from_code(None), ResetPasswordOutcome::Failed);
    }

    #[test]
    fn test_delete_codes() {
        assert_eq!(DeleteAccountOutcome::from_code(Some(0)), DeleteAccountOutcome::Deleted);
        assert_eq!(
            DeleteAccountOutcome::from_code(Some(-1)),
            DeleteAccountOutcome::UserNotFound
        );
        assert_eq!(DeleteAccountOutcome::from_code(Some(1)), DeleteAccountOutcome::Failed);
        assert_eq!(DeleteAccountOutcome::from_code(None), DeleteAccountOutcome::Failed);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let gateway = ScriptedGateway::new().code(0);
        let outcome = UserService::new(&gateway)
            .authenticate(" alice ", "pw")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::Authenticated);

        let calls = gateway.calls();
        assert_eq!(calls[0].sql, "SELECT * FROM sp_authenticate_user($1, $2)");
        assert_eq!(calls[0].params, vec![SqlParam::from("alice"), SqlParam::from("pw")]);
    }

    #[tokio::test]
    async fn test_authenticate_nonzero_is_invalid() {
        let gateway = ScriptedGateway::new().code(1);
        let outcome = UserService::new(&gateway)
            .authenticate("alice", "wrong")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_authenticate_empty_rows_is_invalid() {
        let gateway = ScriptedGateway::new().reply(raw(&["result"], vec![]));
        let outcome = UserService::new(&gateway)
            .authenticate("alice", "pw")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_authenticate_procedure_error_is_invalid() {
        let gateway =
            ScriptedGateway::new().fail(DbError::QueryFailed("no such user".to_string()));
        let outcome = UserService::new(&gateway)
            .authenticate("ghost", "pw")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_authenticate_connection_error_propagates() {
        let gateway = ScriptedGateway::new().fail(DbError::ConnectionFailed("gone".to_string()));
        let result = UserService::new(&gateway).authenticate("alice", "pw").await;
        assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_authenticate_blank_skips_store() {
        let gateway = ScriptedGateway::new();
        let outcome = UserService::new(&gateway)
            .authenticate("alice", "   ")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::InvalidCredentials);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_account_maps_codes() {
        let gateway = ScriptedGateway::new().code(-1).code(-2).code(0).code(15);
        let users = UserService::new(&gateway);
        let account = account();

        assert_eq!(
            users.create_account(&account).await.unwrap(),
            SignupOutcome::UsernameTaken
        );
        assert_eq!(
            users.create_account(&account).await.unwrap(),
            SignupOutcome::EmailTaken
        );
        assert_eq!(users.create_account(&account).await.unwrap(), SignupOutcome::Failed);
        assert_eq!(
            users.create_account(&account).await.unwrap(),
            SignupOutcome::Created { user_id: 15 }
        );

        let call = &gateway.calls()[0];
        assert_eq!(call.params.len(), 9);
        assert_eq!(call.params[4], SqlParam::from("alice"));
        assert_eq!(
            call.params[5],
            SqlParam::Date(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
        );
    }

    #[tokio::test]
    async fn test_create_account_null_id_is_failure() {
        let gateway = ScriptedGateway::new().reply(raw(&["user_id"], vec![vec![CellValue::Null]]));
        let outcome = UserService::new(&gateway)
            .create_account(&account())
            .await
            .unwrap();
        assert_eq!(outcome, SignupOutcome::Failed);
    }

    #[tokio::test]
    async fn test_create_account_validation() {
        let gateway = ScriptedGateway::new();
        let users = UserService::new(&gateway);

        let mut short = account();
        short.height = 0.0;
        assert_eq!(
            users.create_account(&short).await.unwrap(),
            SignupOutcome::Invalid {
                reason: ValidationError::NotPositive("height")
            }
        );

        let mut anonymous = account();
        anonymous.username = " ".into();
        assert_eq!(
            users.create_account(&anonymous).await.unwrap(),
            SignupOutcome::Invalid {
                reason: ValidationError::Required("username")
            }
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_password_mismatch() {
        let gateway = ScriptedGateway::new().code(-3);
        let outcome = UserService::new(&gateway)
            .reset_password("alice@example.com", "alice", "new-pw")
            .await
            .unwrap();
        assert_eq!(outcome, ResetPasswordOutcome::EmailUsernameMismatch);
        assert_eq!(
            gateway.calls()[0].params,
            vec![
                SqlParam::from("alice@example.com"),
                SqlParam::from("new-pw"),
                SqlParam::from("alice"),
            ]
        );
    }

    #[tokio::test]
    async fn test_reset_password_missing_field() {
        let gateway = ScriptedGateway::new();
        let outcome = UserService::new(&gateway)
            .reset_password("alice@example.com", "", "new-pw")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ResetPasswordOutcome::Invalid {
                reason: ValidationError::Required("username")
            }
        );
    }

    #[tokio::test]
    async fn test_delete_account() {
        let gateway = ScriptedGateway::new().code(0).code(1).code(-1);
        let users = UserService::new(&gateway);

        assert!(users.delete_account("alice", true).await.unwrap().is_deleted());
        assert_eq!(
            users.delete_account("alice", true).await.unwrap(),
            DeleteAccountOutcome::Failed
        );
        assert_eq!(
            users.delete_account("alice", true).await.unwrap(),
            DeleteAccountOutcome::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_delete_account_requires_confirmation() {
        let gateway = ScriptedGateway::new();
        let outcome = UserService::new(&gateway)
            .delete_account("alice", false)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DeleteAccountOutcome::Invalid {
                reason: ValidationError::NotConfirmed
            }
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_outcomes_serialize_with_tag() {
        assert_eq!(
            serde_json::to_value(SignupOutcome::Created { user_id: 3 }).unwrap(),
            serde_json::json!({"outcome": "created", "user_id": 3})
        );
        assert_eq!(
            serde_json::to_value(ResetPasswordOutcome::EmailUsernameMismatch).unwrap(),
            serde_json::json!({"outcome": "email_username_mismatch"})
        );
    }
}

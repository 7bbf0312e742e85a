//! Action gateway
//!
//! The only way services talk to the store. A gateway issues queries and
//! procedure calls and hands back a [`RawResult`]; it never looks at what
//! the numbers mean.

use crate::db::params::SqlParam;
use crate::db::types::RawResult;
use crate::error::{DbError, DbResult};
use std::future::Future;

/// Something the gateway can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Parameterized SQL text using `$1..$n` placeholders
    Query(&'a str),
    /// A set-returning procedure, called with one placeholder per parameter
    Procedure(&'a str),
}

impl Statement<'_> {
    /// Render the SQL text sent to the server for `arity` parameters
    ///
    /// # Errors
    /// Returns `DbError::InvalidProcedure` if a procedure name is not a
    /// plain (optionally schema-qualified) identifier
    pub fn to_sql(&self, arity: usize) -> DbResult<String> {
        match self {
            Statement::Query(sql) => Ok((*sql).to_string()),
            Statement::Procedure(name) => {
                if !is_identifier(name) {
                    return Err(DbError::InvalidProcedure((*name).to_string()));
                }
                let placeholders: Vec<String> = (1..=arity).map(|i| format!("${}", i)).collect();
                Ok(format!("SELECT * FROM {}({})", name, placeholders.join(", ")))
            }
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            Statement::Query(_) => "query",
            Statement::Procedure(name) => name,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let part_ok = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    name.split('.').count() <= 2 && name.split('.').all(part_ok)
}

/// Executes statements against one request's connection
///
/// Implemented by [`ActionGateway`](crate::db::ActionGateway) for real
/// connections and by a scripted fake in tests.
pub trait Gateway {
    /// Run a statement with positional parameters
    ///
    /// # Errors
    /// Returns `DbError::QueryFailed` if execution fails, or
    /// `DbError::MalformedResult` if the rows do not line up with the columns
    fn execute(
        &self,
        statement: Statement<'_>,
        params: &[SqlParam],
    ) -> impl Future<Output = DbResult<RawResult>> + Send;
}

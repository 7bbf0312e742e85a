//! Scripted in-memory gateway for unit tests
//!
//! Replies are queued up front and handed out in call order; every call is
//! recorded so tests can check which statement ran with which parameters.

use crate::db::gateway::{Gateway, Statement};
use crate::db::params::SqlParam;
use crate::db::types::{CellValue, ColumnDef, DataType, RawResult, Row};
use crate::error::{DbError, DbResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A call the gateway received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<DbResult<RawResult>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, result: RawResult) -> Self {
        self.replies.lock().unwrap().push_back(Ok(result));
        self
    }

    /// Queue a failure
    pub fn fail(self, error: DbError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a single-cell reply, the shape procedures answer with
    pub fn code(self, code: i64) -> Self {
        self.reply(raw(&["result"], vec![vec![CellValue::Integer(code)]]))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Gateway for ScriptedGateway {
    async fn execute(&self, statement: Statement<'_>, params: &[SqlParam]) -> DbResult<RawResult> {
        let sql = statement.to_sql(params.len())?;
        self.calls.lock().unwrap().push(RecordedCall {
            sql,
            params: params.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DbError::QueryFailed("no scripted reply".to_string())))
    }
}

/// Build a raw result from column names and row values
pub fn raw(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RawResult {
    let columns = columns
        .iter()
        .map(|name| ColumnDef {
            name: name.to_string(),
            data_type: DataType::Unknown("scripted".to_string()),
        })
        .collect();
    let rows = rows.into_iter().map(|values| Row { values }).collect();
    RawResult::new(columns, rows, Duration::ZERO).unwrap()
}

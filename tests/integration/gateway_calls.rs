//! Queries and procedure calls through a real connection

use crate::common::acquire;
use healthtrack::DbError;
use healthtrack::db::{CellValue, Gateway, SqlParam, Statement};

#[tokio::test]
async fn test_query_returns_rows_and_columns() {
    let Some(handle) = acquire().await else {
        return;
    };
    let gateway = handle.gateway();
    let result = gateway
        .execute(
            Statement::Query("SELECT $1::int AS num, 'hello'::text AS msg"),
            &[SqlParam::Int(7)],
        )
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["num", "msg"]);
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0].values[0], CellValue::Integer(7));
    assert_eq!(result.rows[0].values[1], CellValue::Text("hello".to_string()));
}

#[tokio::test]
async fn test_procedure_result_code() {
    let Some(handle) = acquire().await else {
        return;
    };
    let gateway = handle.gateway();
    gateway
        .execute(
            Statement::Query(
                "CREATE FUNCTION pg_temp.sp_echo_code(code integer, label text) \
                 RETURNS TABLE(result integer) \
                 LANGUAGE sql AS 'SELECT code'",
            ),
            &[],
        )
        .await
        .unwrap();

    let result = gateway
        .execute(
            Statement::Procedure("pg_temp.sp_echo_code"),
            &[SqlParam::Int(-3), "ignored".into()],
        )
        .await
        .unwrap();
    assert_eq!(result.first_cell().and_then(|c| c.as_i64()), Some(-3));
}

#[tokio::test]
async fn test_bad_procedure_name_never_reaches_server() {
    let Some(handle) = acquire().await else {
        return;
    };
    let result = handle
        .gateway()
        .execute(Statement::Procedure("sp_x(); DROP TABLE users; --"), &[])
        .await;
    assert!(matches!(result, Err(DbError::InvalidProcedure(_))));
    assert!(handle.is_connected().await);
}

#[tokio::test]
async fn test_sql_error_is_query_failed() {
    let Some(handle) = acquire().await else {
        return;
    };
    let result = handle
        .gateway()
        .execute(Statement::Query("SELECT * FROM no_such_table_here"), &[])
        .await;
    assert!(matches!(result, Err(DbError::QueryFailed(_))));
}

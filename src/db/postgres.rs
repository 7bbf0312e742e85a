//! PostgreSQL connection
//!
//! Concrete implementation using tokio-postgres.

use crate::config::DatabaseTarget;
use crate::config::connections::SslMode;
use crate::db::params::SqlParam;
use crate::db::types::{CellValue, ColumnDef, DataType, RawResult, Row};
use crate::error::{DbError, DbResult};
use crate::session::AuthContext;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_postgres::Client;
use tokio_postgres::types::{ToSql, Type};

/// One physical PostgreSQL session
pub struct PostgresConnection {
    /// The tokio-postgres client
    client: Client,
    /// Background task driving the socket; aborted on drop
    driver: JoinHandle<()>,
}

impl PostgresConnection {
    /// Open a new connection with the request's credentials.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionFailed` if the server rejects the login
    /// or cannot be reached
    pub async fn connect(target: &DatabaseTarget, auth: &AuthContext) -> DbResult<Self> {
        let config = target.pg_config(auth);
        let description = target.connection_string(auth.db_user());

        let (client, driver) = match target.ssl_mode {
            SslMode::Disable => {
                let (client, connection) = config
                    .connect(tokio_postgres::NoTls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                let driver = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!(error = %e, "connection lost");
                    }
                });
                (client, driver)
            }
            SslMode::Prefer | SslMode::Require => {
                let tls_config = make_tls_config();
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
                let (client, connection) = config
                    .connect(tls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                let driver = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!(error = %e, "connection lost");
                    }
                });
                (client, driver)
            }
        };

        tracing::debug!(target_db = %description, "connection opened");
        Ok(Self { client, driver })
    }

    /// Lightweight liveness probe (`SELECT 1`)
    pub async fn is_connected(&self) -> bool {
        if self.client.is_closed() {
            return false;
        }
        self.client.simple_query("SELECT 1").await.is_ok()
    }

    /// Run a parameterized statement and collect rows with their columns
    ///
    /// # Errors
    /// Returns `DbError::QueryFailed` if preparation or execution fails
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> DbResult<RawResult> {
        let start = std::time::Instant::now();

        let stmt = self.client.prepare(sql).await?;

        let columns: Vec<ColumnDef> = stmt
            .columns()
            .iter()
            .map(|col| ColumnDef {
                name: col.name().to_string(),
                data_type: pg_type_to_datatype(col.type_()),
            })
            .collect();

        let bound: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let pg_rows = self.client.query(&stmt, &bound).await?;

        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, col_def)| extract_cell_value(pg_row, i, &col_def.data_type))
                .collect();
            rows.push(Row { values });
        }

        RawResult::new(columns, rows, start.elapsed())
    }
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        // The client closes its half when dropped; the driver may still be
        // waiting on the socket, so stop it too.
        self.driver.abort();
    }
}

/// Map tokio_postgres Type to our DataType enum
fn pg_type_to_datatype(pg_type: &Type) -> DataType {
    match *pg_type {
        Type::INT2 => DataType::SmallInt,
        Type::INT4 => DataType::Integer,
        Type::INT8 => DataType::BigInt,
        Type::FLOAT4 => DataType::Real,
        Type::FLOAT8 => DataType::Double,
        Type::NUMERIC => DataType::Numeric,
        Type::TEXT | Type::NAME => DataType::Text,
        Type::VARCHAR => DataType::Varchar,
        Type::CHAR | Type::BPCHAR => DataType::Char,
        Type::BOOL => DataType::Boolean,
        Type::DATE => DataType::Date,
        Type::TIME => DataType::Time,
        Type::TIMESTAMP => DataType::Timestamp,
        Type::TIMESTAMPTZ => DataType::TimestampTz,
        Type::JSON => DataType::Json,
        Type::JSONB => DataType::Jsonb,
        Type::BYTEA => DataType::Bytea,
        Type::UUID => DataType::Uuid,
        Type::INT4_ARRAY => DataType::Array(Box::new(DataType::Integer)),
        Type::INT8_ARRAY => DataType::Array(Box::new(DataType::BigInt)),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::NAME_ARRAY => {
            DataType::Array(Box::new(DataType::Text))
        }
        _ => DataType::Unknown(pg_type.name().to_string()),
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Extract a cell value from a tokio_postgres Row.
///
/// Tries the expected type first and falls back to the string form.
/// Returns `CellValue::Null` only for actual NULLs.
fn extract_cell_value(row: &tokio_postgres::Row, idx: usize, data_type: &DataType) -> CellValue {
    match data_type {
        DataType::SmallInt => match row.try_get::<_, Option<i16>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| CellValue::Integer(v.into())),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Integer => match row.try_get::<_, Option<i32>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| CellValue::Integer(v.into())),
            Err(_) => try_as_string(row, idx),
        },
        DataType::BigInt => match row.try_get::<_, Option<i64>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Integer),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Real => match row.try_get::<_, Option<f32>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| CellValue::Float(v.into())),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Double => match row.try_get::<_, Option<f64>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Float),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Numeric => match row.try_get::<_, Option<Decimal>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Decimal),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Boolean => match row.try_get::<_, Option<bool>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Boolean),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Date => match row.try_get::<_, Option<chrono::NaiveDate>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Date),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Timestamp => match row.try_get::<_, Option<chrono::NaiveDateTime>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Timestamp),
            Err(_) => try_as_string(row, idx),
        },
        DataType::TimestampTz => {
            match row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx) {
                Ok(v) => v.map_or(CellValue::Null, |v| CellValue::Timestamp(v.naive_utc())),
                Err(_) => try_as_string(row, idx),
            }
        }
        DataType::Time => match row.try_get::<_, Option<chrono::NaiveTime>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Time),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Json | DataType::Jsonb => {
            match row.try_get::<_, Option<serde_json::Value>>(idx) {
                Ok(v) => v.map_or(CellValue::Null, CellValue::Json),
                Err(_) => try_as_string(row, idx),
            }
        }
        DataType::Bytea => match row.try_get::<_, Option<Vec<u8>>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, CellValue::Binary),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Uuid => match row.try_get::<_, Option<uuid::Uuid>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| CellValue::Uuid(v.to_string())),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Array(inner) => extract_array_value(row, idx, inner),
        // Text types and fallback for unknown types
        _ => try_as_string(row, idx),
    }
}

/// Extract the array shapes the health schema actually uses
fn extract_array_value(row: &tokio_postgres::Row, idx: usize, inner: &DataType) -> CellValue {
    match inner {
        DataType::Text => match row.try_get::<_, Option<Vec<String>>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| {
                CellValue::Array(v.into_iter().map(CellValue::Text).collect())
            }),
            Err(_) => try_as_string(row, idx),
        },
        DataType::Integer => match row.try_get::<_, Option<Vec<i32>>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| {
                CellValue::Array(v.into_iter().map(|n| CellValue::Integer(n.into())).collect())
            }),
            Err(_) => try_as_string(row, idx),
        },
        DataType::BigInt => match row.try_get::<_, Option<Vec<i64>>>(idx) {
            Ok(v) => v.map_or(CellValue::Null, |v| {
                CellValue::Array(v.into_iter().map(CellValue::Integer).collect())
            }),
            Err(_) => try_as_string(row, idx),
        },
        _ => try_as_string(row, idx),
    }
}

/// Try to extract a value as a string (fallback for type mismatches).
fn try_as_string(row: &tokio_postgres::Row, idx: usize) -> CellValue {
    match row.try_get::<_, Option<String>>(idx) {
        Ok(Some(v)) => CellValue::Text(v),
        Ok(None) => CellValue::Null,
        Err(_) => {
            let type_name = row
                .columns()
                .get(idx)
                .map_or("unknown", |c| c.type_().name());
            CellValue::Text(format!("<unable to display: {}>", type_name))
        }
    }
}

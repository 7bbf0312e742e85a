//! Database access layer
//!
//! - [`manager`]: one connection per request from an auth context
//! - [`gateway`]: statement execution returning raw rows plus columns
//! - [`postgres`]: the tokio-postgres connection underneath
//! - [`types`]: raw results and cell values

pub mod gateway;
pub mod manager;
pub mod params;
pub mod postgres;
pub mod types;

#[cfg(test)]
pub(crate) mod scripted;

// Re-export main types
pub use gateway::{Gateway, Statement};
pub use manager::{ActionGateway, ConnectionHandle, ConnectionManager};
pub use params::SqlParam;
pub use types::{CellValue, ColumnDef, DataType, RawResult, Record, Row};

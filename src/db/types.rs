//! Database type definitions
//!
//! Core data structures for representing raw results, data types and
//! values. Every call through the gateway, whether a plain query or a
//! procedure, comes back as a [`RawResult`].

use crate::error::{DbError, DbResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::FromStr;
use std::time::Duration;

/// Rows plus the columns they are aligned with
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    /// Column definitions
    pub columns: Vec<ColumnDef>,
    /// Result rows, each with exactly `columns.len()` values
    pub rows: Vec<Row>,
    /// Execution time as measured by the gateway
    pub execution_time: Duration,
}

/// Column definition in a result
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

/// Database data types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    // Integer types
    SmallInt,
    Integer,
    BigInt,

    // Floating point
    Real,
    Double,
    Numeric,

    // Text types
    Text,
    Varchar,
    Char,

    // Boolean
    Boolean,

    // Date/time types
    Date,
    Time,
    Timestamp,
    TimestampTz,

    // JSON types
    Json,
    Jsonb,

    // Binary data
    Bytea,

    // UUID
    Uuid,

    // Array type
    Array(Box<DataType>),

    // Other/unknown types
    Unknown(String),
}

/// A single row of a result
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub values: Vec<CellValue>,
}

/// A cell value (single column value in a row)
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// NULL value
    Null,

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Exact numeric value
    Decimal(Decimal),

    /// Text/string value
    Text(String),

    /// Boolean value
    Boolean(bool),

    /// Calendar date
    Date(NaiveDate),

    /// Date and time (time zones normalized to UTC)
    Timestamp(NaiveDateTime),

    /// Time of day
    Time(NaiveTime),

    /// JSON value (parsed)
    Json(serde_json::Value),

    /// Binary data
    Binary(Vec<u8>),

    /// UUID value
    Uuid(String),

    /// Array value
    Array(Vec<CellValue>),
}

/// One row viewed as `column name -> value`, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl RawResult {
    /// Build a result, checking that every row matches the column count
    ///
    /// # Errors
    /// Returns `DbError::MalformedResult` for ragged rows
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>, execution_time: Duration) -> DbResult<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != columns.len())
        {
            return Err(DbError::MalformedResult(format!(
                "row {} has {} values for {} columns",
                i,
                row.values.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            rows,
            execution_time,
        })
    }

    /// A result with columns but no rows
    pub fn empty(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            execution_time: Duration::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Row 0, column 0, if the result has one.
    ///
    /// This is where procedures put their result code.
    pub fn first_cell(&self) -> Option<&CellValue> {
        self.rows.first().and_then(|r| r.values.first())
    }

    /// Each row zipped with the column names
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record {
                fields: self
                    .columns
                    .iter()
                    .map(|c| c.name.clone())
                    .zip(row.values.iter().cloned())
                    .collect(),
            })
            .collect()
    }

    /// The first row as a record
    pub fn first_record(&self) -> Option<Record> {
        self.records().into_iter().next()
    }
}

impl Record {
    /// Look a field up by column name
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Decimal(d) => Serialize::serialize(d, serializer),
            CellValue::Text(s) | CellValue::Uuid(s) => serializer.serialize_str(s),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Date(d) => d.serialize(serializer),
            CellValue::Timestamp(ts) => ts.serialize(serializer),
            CellValue::Time(t) => t.serialize(serializer),
            CellValue::Json(v) => v.serialize(serializer),
            CellValue::Binary(b) => serializer.serialize_str(&format!("<binary {} bytes>", b.len())),
            CellValue::Array(items) => items.serialize(serializer),
        }
    }
}

/// Text layouts accepted for dates and timestamps arriving as strings
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl CellValue {
    /// Check if this is a NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Read the cell as a whole number.
    ///
    /// Decimals and floats only qualify when they have no fractional part;
    /// text qualifies when it parses. Everything else is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            CellValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the cell as an exact number; NULL and non-numbers are `None`
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Integer(i) => Some(Decimal::from(*i)),
            CellValue::Decimal(d) => Some(*d),
            CellValue::Float(f) => Decimal::from_f64(*f),
            CellValue::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Read the cell as a timestamp; bare dates become midnight
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Date(d) => d.and_hms_opt(0, 0, 0),
            CellValue::Text(s) => {
                let s = s.trim();
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
            }
            _ => None,
        }
    }

    /// Read the cell as a calendar date, truncating timestamps
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_datetime().map(|ts| ts.date())
    }

    /// Get a display string for this cell value (truncated if needed)
    pub fn display_string(&self, max_len: usize) -> String {
        let full = match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Decimal(d) => d.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Date(d) => d.to_string(),
            CellValue::Timestamp(ts) => ts.to_string(),
            CellValue::Time(t) => t.to_string(),
            CellValue::Json(v) => v.to_string(),
            CellValue::Binary(b) => format!("<binary {} bytes>", b.len()),
            CellValue::Uuid(s) => s.clone(),
            CellValue::Array(arr) => {
                let items: Vec<String> = arr.iter().map(|v| v.display_string(max_len)).collect();
                format!("{{{}}}", items.join(","))
            }
        };

        if full.chars().count() > max_len {
            let kept: String = full.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        } else {
            full
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::Decimal(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

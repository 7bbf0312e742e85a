//! Positional statement parameters
//!
//! A closed set of values the services bind into queries and procedure
//! calls. Keeping it an enum (instead of `&dyn ToSql`) lets the scripted
//! test gateway record and compare what was sent.

use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxedError = Box<dyn std::error::Error + Sync + Send>;

/// A value bound to a `$n` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v.into())
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        SqlParam::Numeric(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(v: NaiveDateTime) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlParam::Null, Into::into)
    }
}

impl ToSql for SqlParam {
    /// Encode by delegating to the wrapped value.
    ///
    /// Integers and floats are narrowed to the column's width when the
    /// server asks for `int2`/`int4`/`float4`, since procedure signatures
    /// rarely use `bigint` everywhere.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxedError> {
        match self {
            SqlParam::Null => Ok(IsNull::Yes),
            SqlParam::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            SqlParam::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            SqlParam::Numeric(v) => match *ty {
                Type::FLOAT8 => v
                    .to_f64()
                    .ok_or("numeric out of range for float8")?
                    .to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            SqlParam::Text(v) => v.to_sql_checked(ty, out),
            SqlParam::Date(v) => v.to_sql_checked(ty, out),
            SqlParam::Timestamp(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Per-variant checks happen in to_sql via to_sql_checked
        true
    }

    to_sql_checked!();
}

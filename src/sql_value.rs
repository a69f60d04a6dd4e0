use bytes::BytesMut;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type as PgType};

/// A single statement parameter.
///
/// Rows handed to the batch operations are ordered sequences of these; the
/// executor binds them positionally against the generated placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float8(f64),
    Numeric(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Json(Value),
    Null,
}

impl SqlValue {
    /// The parameter type hint handed to `prepare_typed` when callers build
    /// executor options from a row.
    pub fn to_type(&self) -> PgType {
        match self {
            SqlValue::Bool(_) => PgType::BOOL,
            SqlValue::Int2(_) => PgType::INT2,
            SqlValue::Int4(_) => PgType::INT4,
            SqlValue::Int8(_) => PgType::INT8,
            SqlValue::Float8(_) => PgType::FLOAT8,
            SqlValue::Numeric(_) => PgType::NUMERIC,
            SqlValue::Text(_) => PgType::VARCHAR,
            SqlValue::Bytes(_) => PgType::BYTEA,
            SqlValue::Timestamp(_) => PgType::TIMESTAMPTZ,
            SqlValue::Json(_) => PgType::JSONB,
            SqlValue::Null => PgType::TEXT,
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &PgType,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlValue::Bool(value) => value.to_sql(ty, out),
            SqlValue::Int2(value) => value.to_sql(ty, out),
            SqlValue::Int4(value) => value.to_sql(ty, out),
            SqlValue::Int8(value) => value.to_sql(ty, out),
            SqlValue::Float8(value) => value.to_sql(ty, out),
            SqlValue::Numeric(value) => value.to_sql(ty, out),
            SqlValue::Text(value) => value.to_sql(ty, out),
            SqlValue::Bytes(value) => value.to_sql(ty, out),
            SqlValue::Timestamp(value) => value.to_sql(ty, out),
            SqlValue::Json(value) => value.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &PgType) -> bool {
        true // We accept all types
    }

    to_sql_checked!();
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i16> for SqlValue {
    fn from(value: i16) -> Self {
        SqlValue::Int2(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int4(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int8(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float8(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Numeric(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        SqlValue::Json(value)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => SqlValue::Null,
        }
    }
}

// src/query_builders/value.rs
//! Bind values carried alongside generated clauses

use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

/// Postgres parameter type a value is sent as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Decimal,
    Boolean,
}

/// A scalar bound to a `$N` placeholder. Never interpolated into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    /// Typed NULL; the parameter type must be assignable to the target column.
    Null(SqlType),
}

impl SqlValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// Appends this value to a Postgres argument list.
    pub fn add_to(&self, args: &mut PgArguments) {
        match self {
            SqlValue::Text(s) => args.add(s.clone()),
            SqlValue::Integer(n) => args.add(*n),
            SqlValue::Decimal(d) => args.add(*d),
            SqlValue::Boolean(b) => args.add(*b),
            SqlValue::Null(SqlType::Text) => args.add(None::<String>),
            SqlValue::Null(SqlType::Integer) => args.add(None::<i64>),
            SqlValue::Null(SqlType::Decimal) => args.add(None::<Decimal>),
            SqlValue::Null(SqlType::Boolean) => args.add(None::<bool>),
        }
    }
}

/// Builds the argument list for a clause, preserving placeholder order.
pub fn to_arguments(values: &[SqlValue]) -> PgArguments {
    let mut args = PgArguments::default();
    for value in values {
        value.add_to(&mut args);
    }
    args
}

/// Rust types with a fixed [`SqlType`], so `None::<T>` becomes a typed NULL.
pub trait SqlTyped {
    const SQL_TYPE: SqlType;
}

impl SqlTyped for String {
    const SQL_TYPE: SqlType = SqlType::Text;
}

impl SqlTyped for &str {
    const SQL_TYPE: SqlType = SqlType::Text;
}

impl SqlTyped for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;
}

impl SqlTyped for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;
}

impl SqlTyped for Decimal {
    const SQL_TYPE: SqlType = SqlType::Decimal;
}

impl SqlTyped for bool {
    const SQL_TYPE: SqlType = SqlType::Boolean;
}

// ==================== FROM IMPLEMENTATIONS ====================

impl From<String> for SqlValue {
    fn from(s: String) -> Self { SqlValue::Text(s) }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self { SqlValue::Text(s.to_string()) }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self { SqlValue::Integer(n) }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self { SqlValue::Integer(n as i64) }
}

impl From<Decimal> for SqlValue {
    fn from(d: Decimal) -> Self { SqlValue::Decimal(d) }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self { SqlValue::Boolean(b) }
}

impl<T: Into<SqlValue> + SqlTyped> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null(T::SQL_TYPE),
        }
    }
}

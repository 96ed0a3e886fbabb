// src/query_builders/filters/mod.rs
//! Optional-filter SELECT generation
//!
//! Each entity declares a closed enum of filter kinds and maps every kind to
//! a fixed [`Predicate`]. The engine drops absent filters, numbers the
//! survivors' placeholders by position and joins them with `AND`.
//! Column names only ever come from the `&'static str`s in those tables.

pub mod companies;
pub mod jobs;

use std::fmt;

use super::SqlValue;

/// SQL template attached to a filter kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `col ILIKE $n`, bound as `%value%`
    Contains(&'static str),
    /// `col >= $n`
    AtLeast(&'static str),
    /// `col <= $n`
    AtMost(&'static str),
    /// Fixed SQL with no placeholder. Applied only when the flag is `true`.
    Flag(&'static str),
}

impl Predicate {
    /// Whether this predicate consumes a value slot.
    #[inline]
    pub fn binds_value(&self) -> bool {
        !matches!(self, Predicate::Flag(_))
    }

    /// A false flag means "no filter", not "filter for false".
    fn is_present(&self, value: &SqlValue) -> bool {
        match self {
            Predicate::Flag(_) => matches!(value, SqlValue::Boolean(true)),
            _ => !value.is_null(),
        }
    }

    fn render(&self, placeholder: usize) -> String {
        match self {
            Predicate::Contains(col) => format!("{} ILIKE ${}", col, placeholder),
            Predicate::AtLeast(col) => format!("{} >= ${}", col, placeholder),
            Predicate::AtMost(col) => format!("{} <= ${}", col, placeholder),
            Predicate::Flag(sql) => sql.to_string(),
        }
    }

    fn transform(&self, value: SqlValue) -> SqlValue {
        match (self, value) {
            (Predicate::Contains(_), SqlValue::Text(s)) => SqlValue::Text(format!("%{}%", s)),
            (_, other) => other,
        }
    }
}

/// A named optional filter of one entity.
///
/// Placeholders are numbered by position among the filters that survive the
/// presence check, so kinds whose predicate does not bind a value must be
/// declared after every kind that does.
pub trait FilterKind: Copy + fmt::Debug {
    fn predicate(self) -> Predicate;
}

/// Fixed parts of a filtered listing.
#[derive(Debug, Clone, Copy)]
pub struct SelectTarget {
    pub columns: &'static str,
    pub table: &'static str,
    pub order_by: &'static str,
}

/// Complete SELECT statement and its bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredQuery {
    pub db_query: String,
    pub filter_values: Vec<SqlValue>,
}

/// Assembles `SELECT <columns> FROM <table> [WHERE ...] ORDER BY <col>`.
///
/// `filters` must be in declaration order. With no surviving filter the
/// WHERE keyword is omitted and the unfiltered listing is returned.
pub fn build_filtered_query<K: FilterKind>(
    target: &SelectTarget,
    filters: Vec<(K, Option<SqlValue>)>,
) -> FilteredQuery {
    let surviving: Vec<(Predicate, SqlValue)> = filters
        .into_iter()
        .filter_map(|(kind, value)| {
            let predicate = kind.predicate();
            value
                .filter(|v| predicate.is_present(v))
                .map(|v| (predicate, v))
        })
        .collect();

    let mut fragments = Vec::with_capacity(surviving.len());
    let mut filter_values = Vec::with_capacity(surviving.len());

    for (idx, (predicate, value)) in surviving.into_iter().enumerate() {
        fragments.push(predicate.render(idx + 1));
        if predicate.binds_value() {
            filter_values.push(predicate.transform(value));
        }
    }

    let mut db_query = format!("SELECT {} FROM {}", target.columns, target.table);
    if !fragments.is_empty() {
        db_query.push_str(" WHERE ");
        db_query.push_str(&fragments.join(" AND "));
    }
    db_query.push_str(" ORDER BY ");
    db_query.push_str(target.order_by);

    tracing::debug!(table = target.table, sql = %db_query, "built filtered listing");

    FilteredQuery { db_query, filter_values }
}

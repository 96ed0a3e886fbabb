// src/query_builders/update.rs
//! SET-clause generation for partial updates

use super::SqlValue;

/// `SET` fragment plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_cols: String,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Placeholder for the first parameter a caller appends after the SET values,
    /// typically the row key in `WHERE key = $N`.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }

    /// SET values followed by `trailing`, ready for binding.
    pub fn values_with(&self, trailing: SqlValue) -> Vec<SqlValue> {
        let mut values = self.values.clone();
        values.push(trailing);
        values
    }
}

/// Renders `col1=$1, col2=$2, ...` in the order the changes were given.
///
/// Column names are emitted as raw SQL, which is why `C` is a closed
/// per-table enum rather than a free-form string. An empty slice produces an
/// empty clause and no values; rejecting empty updates is the caller's job.
pub fn sql_for_partial_update<C: AsRef<str>>(data: &[(C, SqlValue)]) -> PartialUpdate {
    let cols: Vec<String> = data
        .iter()
        .enumerate()
        .map(|(idx, (col, _))| format!("{}=${}", col.as_ref(), idx + 1))
        .collect();

    PartialUpdate {
        set_cols: cols.join(", "),
        values: data.iter().map(|(_, value)| value.clone()).collect(),
    }
}

// src/query_builders/mod.rs
//! Parameterized SQL fragment builders
//!
//! Every builder returns SQL text containing only `$N` placeholders plus the
//! ordered values for them. Values are bound through [`to_arguments`].

pub mod columns;
pub mod filters;
pub mod update;
pub mod value;

pub use columns::{CompanyColumn, JobColumn, UserColumn};
pub use filters::companies::sql_for_filtering_companies;
pub use filters::jobs::sql_for_filtering_jobs;
pub use update::sql_for_partial_update;
pub use value::{to_arguments, SqlValue};

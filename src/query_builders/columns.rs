// src/query_builders/columns.rs
//! Columns that may appear in a generated SET clause
//!
//! Keys never come from request JSON. Handlers map typed request fields onto
//! these enums, so only listed columns can reach SQL text.

use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CompanyColumn {
    Name,
    Description,
    NumEmployees,
    LogoUrl,
}

/// `id` and `company_handle` are fixed after creation and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum JobColumn {
    Title,
    Salary,
    Equity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum UserColumn {
    FirstName,
    LastName,
    Password,
    Email,
}

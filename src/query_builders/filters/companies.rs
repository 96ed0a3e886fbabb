// src/query_builders/filters/companies.rs
use strum::{AsRefStr, Display};

use super::{build_filtered_query, FilterKind, FilteredQuery, Predicate, SelectTarget};
use crate::error::{ApiError, ApiResult};
use crate::query_builders::SqlValue;

/// Filters accepted by the company listing, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum CompanyFilter {
    NameLike,
    MinEmployees,
    MaxEmployees,
}

impl FilterKind for CompanyFilter {
    fn predicate(self) -> Predicate {
        match self {
            CompanyFilter::NameLike => Predicate::Contains("name"),
            CompanyFilter::MinEmployees => Predicate::AtLeast("num_employees"),
            CompanyFilter::MaxEmployees => Predicate::AtMost("num_employees"),
        }
    }
}

pub const COMPANY_LISTING: SelectTarget = SelectTarget {
    columns: "handle, name",
    table: "companies",
    order_by: "name",
};

/// Builds the company listing query.
///
/// Fails with a bad request, before anything is built, when both bounds are
/// given and `min_employees > max_employees`.
pub fn sql_for_filtering_companies(
    name_like: Option<&str>,
    min_employees: Option<i64>,
    max_employees: Option<i64>,
) -> ApiResult<FilteredQuery> {
    if let (Some(min), Some(max)) = (min_employees, max_employees) {
        if min > max {
            return Err(ApiError::BadRequest(format!(
                "{} is greater than {}.",
                CompanyFilter::MinEmployees,
                CompanyFilter::MaxEmployees
            )));
        }
    }

    Ok(build_filtered_query(&COMPANY_LISTING, vec![
        (CompanyFilter::NameLike, name_like.map(SqlValue::from)),
        (CompanyFilter::MinEmployees, min_employees.map(SqlValue::from)),
        (CompanyFilter::MaxEmployees, max_employees.map(SqlValue::from)),
    ]))
}

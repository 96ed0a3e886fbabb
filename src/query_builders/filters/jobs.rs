// src/query_builders/filters/jobs.rs
use strum::{AsRefStr, Display};

use super::{build_filtered_query, FilterKind, FilteredQuery, Predicate, SelectTarget};
use crate::query_builders::SqlValue;

/// Filters accepted by the job listing. `HasEquity` binds no value and stays last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum JobFilter {
    Title,
    MinSalary,
    HasEquity,
}

#[cfg(test)]
impl JobFilter {
    pub const ALL: [JobFilter; 3] = [JobFilter::Title, JobFilter::MinSalary, JobFilter::HasEquity];
}

impl FilterKind for JobFilter {
    fn predicate(self) -> Predicate {
        match self {
            JobFilter::Title => Predicate::Contains("title"),
            JobFilter::MinSalary => Predicate::AtLeast("salary"),
            JobFilter::HasEquity => Predicate::Flag("equity > 0"),
        }
    }
}

pub const JOB_LISTING: SelectTarget = SelectTarget {
    columns: "id, title, salary, equity, company_handle",
    table: "jobs",
    order_by: "title",
};

/// Builds the job listing query. `has_equity = Some(false)` applies no filter.
pub fn sql_for_filtering_jobs(
    title: Option<&str>,
    min_salary: Option<i64>,
    has_equity: Option<bool>,
) -> FilteredQuery {
    build_filtered_query(&JOB_LISTING, vec![
        (JobFilter::Title, title.map(SqlValue::from)),
        (JobFilter::MinSalary, min_salary.map(SqlValue::from)),
        (JobFilter::HasEquity, has_equity.map(SqlValue::from)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_min_salary() {
        let result = sql_for_filtering_jobs(Some("test"), Some(100000), None);

        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE title ILIKE $1 AND salary >= $2 ORDER BY title"
        );
        assert_eq!(result.filter_values, vec![SqlValue::from("%test%"), SqlValue::from(100000i64)]);
    }

    #[test]
    fn test_min_salary_with_equity_false_drops_flag() {
        let result = sql_for_filtering_jobs(None, Some(100000), Some(false));

        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE salary >= $1 ORDER BY title"
        );
        assert_eq!(result.filter_values, vec![SqlValue::from(100000i64)]);
    }

    #[test]
    fn test_min_salary_with_equity_true() {
        let result = sql_for_filtering_jobs(None, Some(100000), Some(true));

        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE salary >= $1 AND equity > 0 ORDER BY title"
        );
        // The flag renders text but takes no value slot.
        assert_eq!(result.filter_values, vec![SqlValue::from(100000i64)]);
    }

    #[test]
    fn test_all_filters() {
        let result = sql_for_filtering_jobs(Some("test"), Some(100000), Some(true));

        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE title ILIKE $1 AND salary >= $2 AND equity > 0 ORDER BY title"
        );
        assert_eq!(result.filter_values, vec![SqlValue::from("%test%"), SqlValue::from(100000i64)]);
    }

    #[test]
    fn test_only_has_equity() {
        let result = sql_for_filtering_jobs(None, None, Some(true));

        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE equity > 0 ORDER BY title"
        );
        assert!(result.filter_values.is_empty());
    }

    #[test]
    fn test_no_filters_lists_everything() {
        let result = sql_for_filtering_jobs(None, None, Some(false));
        assert_eq!(
            result.db_query,
            "SELECT id, title, salary, equity, company_handle FROM jobs ORDER BY title"
        );
    }

    #[test]
    fn test_value_free_filters_are_declared_last() {
        // Placeholders are numbered over surviving filters; a flag ahead of a
        // binding filter would leave a gap between $N and the value list.
        let first_flag = JobFilter::ALL
            .iter()
            .position(|f| !f.predicate().binds_value())
            .unwrap();
        assert!(JobFilter::ALL[first_flag..].iter().all(|f| !f.predicate().binds_value()));
    }

    #[test]
    fn test_placeholder_count_matches_values() {
        for title in [None, Some("a")] {
            for min_salary in [None, Some(1)] {
                for has_equity in [None, Some(false), Some(true)] {
                    let result = sql_for_filtering_jobs(title, min_salary, has_equity);
                    let placeholders = result.db_query.matches('$').count();
                    assert_eq!(placeholders, result.filter_values.len(), "{}", result.db_query);
                }
            }
        }
    }

    #[test]
    fn test_is_idempotent() {
        assert_eq!(
            sql_for_filtering_jobs(Some("eng"), None, Some(true)),
            sql_for_filtering_jobs(Some("eng"), None, Some(true))
        );
    }
}

// src/models/job.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::validation_error;
use crate::error::{ApiError, ApiResult};
use crate::query_builders::{
    sql_for_filtering_jobs, sql_for_partial_update, to_arguments, JobColumn, SqlValue,
};

// ==================== JOB ====================

/// `equity` is NUMERIC and serializes as a decimal string, e.g. `"0.5"`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary: Option<i32>,

    #[validate(custom(function = "validate_equity"))]
    pub equity: Option<Decimal>,

    #[validate(length(min = 1, max = 25, message = "Company handle must be between 1 and 25 characters"))]
    pub company_handle: String,
}

/// `Some(None)` on `salary` or `equity` clears the column. `company_handle`
/// and `id` are accepted, even as `null`, only so they can be rejected with a
/// specific message.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_nullable_job_fields"))]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub salary: Option<Option<i32>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub equity: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub company_handle: Option<Option<String>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub id: Option<Option<i32>>,
}

impl UpdateJobRequest {
    pub fn changes(&self) -> Vec<(JobColumn, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(title) = &self.title {
            changes.push((JobColumn::Title, SqlValue::from(title.as_str())));
        }
        if let Some(salary) = self.salary {
            changes.push((JobColumn::Salary, SqlValue::from(salary)));
        }
        if let Some(equity) = self.equity {
            changes.push((JobColumn::Equity, SqlValue::from(equity)));
        }
        changes
    }
}

/// `GET /jobs` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobQuery {
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
}

fn validate_equity(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value >= Decimal::ZERO && *value <= Decimal::ONE {
        Ok(())
    } else {
        Err(validation_error("invalid_equity", "Equity must be between 0 and 1"))
    }
}

fn validate_nullable_job_fields(request: &UpdateJobRequest) -> Result<(), validator::ValidationError> {
    if let Some(Some(salary)) = request.salary {
        if salary < 0 {
            return Err(validation_error("invalid_salary", "Salary cannot be negative"));
        }
    }
    if let Some(Some(equity)) = &request.equity {
        validate_equity(equity)?;
    }
    Ok(())
}

// ==================== DATABASE OPERATIONS ====================

impl Job {
    pub async fn find_all(pool: &PgPool, query: &JobQuery) -> ApiResult<Vec<Job>> {
        let listing = sql_for_filtering_jobs(query.title.as_deref(), query.min_salary, query.has_equity);

        let jobs = sqlx::query_as_with::<_, Job, _>(&listing.db_query, to_arguments(&listing.filter_values))
            .fetch_all(pool)
            .await?;

        Ok(jobs)
    }

    pub async fn find_for_company(pool: &PgPool, handle: &str) -> ApiResult<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"SELECT id, title, salary, equity, company_handle
               FROM jobs
               WHERE company_handle = $1
               ORDER BY id"#,
        )
            .bind(handle)
            .fetch_all(pool)
            .await?;

        Ok(jobs)
    }

    pub async fn get(pool: &PgPool, id: i32) -> ApiResult<Job> {
        sqlx::query_as::<_, Job>(
            r#"SELECT id, title, salary, equity, company_handle
               FROM jobs
               WHERE id = $1"#,
        )
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::job_not_found(id))
    }

    pub async fn create(pool: &PgPool, request: CreateJobRequest) -> ApiResult<Job> {
        let company: Option<String> = sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
            .bind(&request.company_handle)
            .fetch_optional(pool)
            .await?;

        if company.is_none() {
            return Err(ApiError::unknown_company_handle(&request.company_handle));
        }

        let job = sqlx::query_as::<_, Job>(
            r#"INSERT INTO jobs (title, salary, equity, company_handle)
               VALUES ($1, $2, $3, $4)
               RETURNING id, title, salary, equity, company_handle"#,
        )
            .bind(&request.title)
            .bind(request.salary)
            .bind(request.equity)
            .bind(&request.company_handle)
            .fetch_one(pool)
            .await?;

        Ok(job)
    }

    pub async fn update(pool: &PgPool, id: i32, request: &UpdateJobRequest) -> ApiResult<Job> {
        if request.company_handle.is_some() {
            return Err(ApiError::bad_request("Cannot change company handle."));
        }
        if request.id.is_some() {
            return Err(ApiError::bad_request("Cannot change job id."));
        }

        let update = sql_for_partial_update(&request.changes());
        if update.is_empty() {
            return Err(ApiError::no_data());
        }

        let sql = format!(
            r#"UPDATE jobs
               SET {}
               WHERE id = {}
               RETURNING id, title, salary, equity, company_handle"#,
            update.set_cols,
            update.next_placeholder()
        );

        sqlx::query_as_with::<_, Job, _>(&sql, to_arguments(&update.values_with(id.into())))
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::job_not_found(id))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> ApiResult<()> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ApiError::job_not_found(id))
    }
}

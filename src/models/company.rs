// src/models/company.rs
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::{Validate, ValidateUrl};

use super::job::Job;
use super::validation_error;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::query_builders::{
    sql_for_filtering_companies, sql_for_partial_update, to_arguments, CompanyColumn, SqlValue,
};

lazy_static! {
    static ref HANDLE_REGEX: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
}

// ==================== COMPANY ====================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

/// Row shape of the company listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct CompanySummary {
    pub handle: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanyRequest {
    #[validate(
        length(min = 1, max = 25, message = "Handle must be between 1 and 25 characters"),
        custom(function = "validate_handle")
    )]
    pub handle: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0, message = "Number of employees cannot be negative"))]
    pub num_employees: Option<i32>,

    pub description: String,

    #[validate(url(message = "Logo URL must be a valid URL"))]
    pub logo_url: Option<String>,
}

/// Changeable company fields. The handle is the key and cannot be changed.
///
/// The nullable columns distinguish a missing key (`None`, left alone) from
/// an explicit `null` (`Some(None)`, cleared). A `null` for `name` or
/// `description` counts as missing.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_nullable_company_fields"))]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub num_employees: Option<Option<i32>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub logo_url: Option<Option<String>>,
}

impl UpdateCompanyRequest {
    pub fn changes(&self) -> Vec<(CompanyColumn, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(name) = &self.name {
            changes.push((CompanyColumn::Name, SqlValue::from(name.as_str())));
        }
        if let Some(description) = &self.description {
            changes.push((CompanyColumn::Description, SqlValue::from(description.as_str())));
        }
        if let Some(num_employees) = self.num_employees {
            changes.push((CompanyColumn::NumEmployees, SqlValue::from(num_employees)));
        }
        if let Some(logo_url) = &self.logo_url {
            changes.push((CompanyColumn::LogoUrl, SqlValue::from(logo_url.as_deref())));
        }
        changes
    }
}

/// `GET /companies` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyQuery {
    pub name_like: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

fn validate_nullable_company_fields(request: &UpdateCompanyRequest) -> Result<(), validator::ValidationError> {
    if let Some(Some(num_employees)) = request.num_employees {
        if num_employees < 0 {
            return Err(validation_error("invalid_num_employees", "Number of employees cannot be negative"));
        }
    }
    if let Some(Some(logo_url)) = &request.logo_url {
        if !logo_url.validate_url() {
            return Err(validation_error("invalid_logo_url", "Logo URL must be a valid URL"));
        }
    }
    Ok(())
}

fn validate_handle(value: &str) -> Result<(), validator::ValidationError> {
    if HANDLE_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(validation_error(
            "invalid_handle",
            "Handle may contain only lowercase letters, digits and single dashes",
        ))
    }
}

// ==================== DATABASE OPERATIONS ====================

impl Company {
    pub async fn find_all(pool: &PgPool, query: &CompanyQuery) -> ApiResult<Vec<CompanySummary>> {
        let listing = sql_for_filtering_companies(
            query.name_like.as_deref(),
            query.min_employees,
            query.max_employees,
        )?;

        let companies = sqlx::query_as_with::<_, CompanySummary, _>(
            &listing.db_query,
            to_arguments(&listing.filter_values),
        )
            .fetch_all(pool)
            .await?;

        Ok(companies)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> ApiResult<CompanyWithJobs> {
        let company = sqlx::query_as::<_, Company>(
            r#"SELECT handle, name, num_employees, description, logo_url
               FROM companies
               WHERE handle = $1"#,
        )
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::company_not_found(handle))?;

        let jobs = Job::find_for_company(pool, handle).await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    pub async fn create(pool: &PgPool, request: CreateCompanyRequest) -> ApiResult<Company> {
        let duplicate: Option<String> = sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
            .bind(&request.handle)
            .fetch_optional(pool)
            .await?;

        if duplicate.is_some() {
            return Err(ApiError::duplicate_company(&request.handle));
        }

        let company = sqlx::query_as::<_, Company>(
            r#"INSERT INTO companies (handle, name, num_employees, description, logo_url)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING handle, name, num_employees, description, logo_url"#,
        )
            .bind(&request.handle)
            .bind(&request.name)
            .bind(request.num_employees)
            .bind(&request.description)
            .bind(&request.logo_url)
            .fetch_one(pool)
            .await
            .map_err(|err| {
                // Lost a race on the handle, or the name is taken.
                if is_unique_violation(&err) {
                    ApiError::duplicate_company(&request.handle)
                } else {
                    ApiError::from(err)
                }
            })?;

        Ok(company)
    }

    pub async fn update(pool: &PgPool, handle: &str, request: &UpdateCompanyRequest) -> ApiResult<Company> {
        let update = sql_for_partial_update(&request.changes());
        if update.is_empty() {
            return Err(ApiError::no_data());
        }

        let sql = format!(
            r#"UPDATE companies
               SET {}
               WHERE handle = {}
               RETURNING handle, name, num_employees, description, logo_url"#,
            update.set_cols,
            update.next_placeholder()
        );

        sqlx::query_as_with::<_, Company, _>(&sql, to_arguments(&update.values_with(handle.into())))
            .fetch_optional(pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ApiError::bad_request("Company name already taken")
                } else {
                    ApiError::from(err)
                }
            })?
            .ok_or_else(|| ApiError::company_not_found(handle))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> ApiResult<()> {
        let deleted: Option<String> = sqlx::query_scalar("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ApiError::company_not_found(handle))
    }
}

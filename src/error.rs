// src/error.rs - API error type shared by models, handlers and the query builder
use actix_web::{HttpResponse, ResponseError};
use actix_web::http::StatusCode;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    InternalServerError(String),
    DatabaseError(sqlx::Error),
    AuthError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(err) => write!(f, "Database Error: {}", err),
            ApiError::AuthError(msg) => write!(f, "Auth Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::AuthError(_) => StatusCode::UNAUTHORIZED,
            ApiError::DatabaseError(_) | ApiError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Driver errors can leak schema details; log them and send a generic message.
        let message = match self {
            ApiError::DatabaseError(err) => {
                log::error!("Database error: {}", err);
                "Database Error: query failed".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            message,
        })
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        log::error!("Password hashing failed: {}", err);
        ApiError::InternalServerError("Password hashing failed".to_string())
    }
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        ApiError::BadRequest(msg.to_string())
    }

    pub fn unauthorized(msg: &str) -> Self {
        ApiError::Unauthorized(msg.to_string())
    }

    pub fn no_data() -> Self {
        ApiError::BadRequest("No data".to_string())
    }

    pub fn company_not_found(handle: &str) -> Self {
        ApiError::NotFound(format!("No company: {}", handle))
    }

    pub fn job_not_found(id: i32) -> Self {
        ApiError::NotFound(format!("No job: {}", id))
    }

    pub fn user_not_found(username: &str) -> Self {
        ApiError::NotFound(format!("No user: {}", username))
    }

    pub fn duplicate_company(handle: &str) -> Self {
        ApiError::BadRequest(format!("Duplicate company: {}", handle))
    }

    pub fn duplicate_username(username: &str) -> Self {
        ApiError::BadRequest(format!("Duplicate username: {}", username))
    }

    pub fn unknown_company_handle(handle: &str) -> Self {
        ApiError::BadRequest(format!("Company handle {} is unknown.", handle))
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

/// Maps body/query deserialization failures (unknown fields, wrong types) to 400s.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}

pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}

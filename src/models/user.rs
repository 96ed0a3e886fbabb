// src/models/user.rs
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::AuthService;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::query_builders::{sql_for_partial_update, to_arguments, SqlValue, UserColumn};

// ==================== USER ====================

/// Public user record; the password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPassword {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<UserWithPassword> for User {
    fn from(row: UserWithPassword) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

// ==================== REQUEST/RESPONSE STRUCTS ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 25, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Self-registration body. Never creates an admin.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 25, message = "Username must be 1-25 characters"))]
    pub username: String,
    #[validate(length(min = 5, max = 20, message = "Password must be 5-20 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"), length(min = 6, max = 60))]
    pub email: String,
}

/// Admin-created user; may carry `is_admin`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewUserRequest {
    #[validate(length(min = 1, max = 25, message = "Username must be 1-25 characters"))]
    pub username: String,
    #[validate(length(min = 5, max = 20, message = "Password must be 5-20 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"), length(min = 6, max = 60))]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<RegisterRequest> for NewUserRequest {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            is_admin: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    pub last_name: Option<String>,
    #[validate(length(min = 5, max = 20, message = "Password must be 5-20 characters"))]
    pub password: Option<String>,
    #[validate(email(message = "Invalid email format"), length(min = 6, max = 60))]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ==================== DATABASE OPERATIONS ====================

impl User {
    /// Checks credentials. Unknown users and wrong passwords fail the same way.
    pub async fn authenticate(
        pool: &PgPool,
        auth: &AuthService,
        username: &str,
        password: &str,
    ) -> ApiResult<User> {
        let row = sqlx::query_as::<_, UserWithPassword>(
            r#"SELECT username, password, first_name, last_name, email, is_admin
               FROM users
               WHERE username = $1"#,
        )
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if let Some(row) = row {
            if auth.verify_password(password, &row.password)? {
                return Ok(row.into());
            }
        }

        Err(ApiError::unauthorized("Invalid username/password"))
    }

    pub async fn register(pool: &PgPool, auth: &AuthService, request: NewUserRequest) -> ApiResult<User> {
        let duplicate: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(&request.username)
            .fetch_optional(pool)
            .await?;

        if duplicate.is_some() {
            return Err(ApiError::duplicate_username(&request.username));
        }

        let hashed = auth.hash_password(&request.password)?;

        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (username, password, first_name, last_name, email, is_admin)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING username, first_name, last_name, email, is_admin"#,
        )
            .bind(&request.username)
            .bind(&hashed)
            .bind(&request.first_name)
            .bind(&request.last_name)
            .bind(&request.email)
            .bind(request.is_admin)
            .fetch_one(pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ApiError::duplicate_username(&request.username)
                } else {
                    ApiError::from(err)
                }
            })
    }

    pub async fn find_all(pool: &PgPool) -> ApiResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT username, first_name, last_name, email, is_admin
               FROM users
               ORDER BY username"#,
        )
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    pub async fn get(pool: &PgPool, username: &str) -> ApiResult<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT username, first_name, last_name, email, is_admin
               FROM users
               WHERE username = $1"#,
        )
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::user_not_found(username))
    }

    /// Partial update; a new password is hashed before it is stored.
    pub async fn update(
        pool: &PgPool,
        auth: &AuthService,
        username: &str,
        request: &UpdateUserRequest,
    ) -> ApiResult<User> {
        let mut changes: Vec<(UserColumn, SqlValue)> = Vec::new();
        if let Some(first_name) = &request.first_name {
            changes.push((UserColumn::FirstName, first_name.as_str().into()));
        }
        if let Some(last_name) = &request.last_name {
            changes.push((UserColumn::LastName, last_name.as_str().into()));
        }
        if let Some(password) = &request.password {
            changes.push((UserColumn::Password, auth.hash_password(password)?.into()));
        }
        if let Some(email) = &request.email {
            changes.push((UserColumn::Email, email.as_str().into()));
        }

        let update = sql_for_partial_update(&changes);
        if update.is_empty() {
            return Err(ApiError::no_data());
        }

        let sql = format!(
            r#"UPDATE users
               SET {}
               WHERE username = {}
               RETURNING username, first_name, last_name, email, is_admin"#,
            update.set_cols,
            update.next_placeholder()
        );

        sqlx::query_as_with::<_, User, _>(&sql, to_arguments(&update.values_with(username.into())))
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::user_not_found(username))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> ApiResult<()> {
        let deleted: Option<String> = sqlx::query_scalar("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ApiError::user_not_found(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn new_user(username: &str, is_admin: bool) -> NewUserRequest {
        NewUserRequest {
            username: username.to_string(),
            password: "password".to_string(),
            first_name: "Test".to_string(),
            last_name: "Tester".to_string(),
            email: "test@test.com".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_register_request_validation() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"username": "new", "password": "pw", "first_name": "N", "last_name": "U", "email": "n@u.com"}"#,
        )
            .unwrap();
        assert!(request.validate().is_err());

        let parsed = serde_json::from_str::<RegisterRequest>(
            r#"{"username": "new", "password": "password", "first_name": "N", "last_name": "U", "email": "n@u.com", "is_admin": true}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_register_request_never_admin() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"username": "new", "password": "password", "first_name": "N", "last_name": "U", "email": "n@u.com"}"#,
        )
            .unwrap();
        assert!(!NewUserRequest::from(request).is_admin);
    }

    #[actix_rt::test]
    async fn test_authenticate() {
        let Some(db) = test_support::TestDb::acquire().await else { return };

        let user = User::authenticate(&db.pool, &db.auth, "test", "password").await.unwrap();
        assert_eq!(user.email, "test@test.com");
        assert!(!user.is_admin);

        let err = User::authenticate(&db.pool, &db.auth, "test", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid username/password");

        let err = User::authenticate(&db.pool, &db.auth, "nobody", "password").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[actix_rt::test]
    async fn test_register() {
        let Some(db) = test_support::TestDb::acquire().await else { return };

        let user = User::register(&db.pool, &db.auth, new_user("new", true)).await.unwrap();
        assert_eq!(user.username, "new");
        assert!(user.is_admin);

        let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = 'new'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert!(stored.starts_with("$2"));

        let err = User::register(&db.pool, &db.auth, new_user("new", false)).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: Duplicate username: new");
    }

    #[actix_rt::test]
    async fn test_find_all_and_get() {
        let Some(db) = test_support::TestDb::acquire().await else { return };

        let names: Vec<String> = User::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["admin", "test", "test2"]);

        assert_eq!(User::get(&db.pool, "test2").await.unwrap().first_name, "Test2");
        let err = User::get(&db.pool, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Not Found: No user: nope");
    }

    #[actix_rt::test]
    async fn test_update_rehashes_password() {
        let Some(db) = test_support::TestDb::acquire().await else { return };

        let request = UpdateUserRequest {
            first_name: Some("New".into()),
            password: Some("new-password".into()),
            ..Default::default()
        };
        let user = User::update(&db.pool, &db.auth, "test", &request).await.unwrap();
        assert_eq!(user.first_name, "New");

        assert!(User::authenticate(&db.pool, &db.auth, "test", "new-password").await.is_ok());
        assert!(User::authenticate(&db.pool, &db.auth, "test", "password").await.is_err());

        let err = User::update(&db.pool, &db.auth, "test", &UpdateUserRequest::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: No data");

        assert!(matches!(
            User::update(&db.pool, &db.auth, "nope", &request).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_remove() {
        let Some(db) = test_support::TestDb::acquire().await else { return };

        User::remove(&db.pool, "test").await.unwrap();
        assert!(matches!(User::get(&db.pool, "test").await, Err(ApiError::NotFound(_))));
        assert!(matches!(User::remove(&db.pool, "test").await, Err(ApiError::NotFound(_))));
    }
}

// src/user_handlers.rs
//! User management. Listing and creation are admin-only; a single user can be
//! read, changed or deleted by that user or by an admin.

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{ensure_admin, ensure_correct_user_or_admin};
use crate::error::ApiResult;
use crate::models::{NewUserRequest, UpdateUserRequest, User};
use crate::AppState;

pub async fn list_users(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    ensure_admin(&req)?;

    let users = User::find_all(&app_state.db_pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

/// Admin-only; unlike self-registration this may create admins.
pub async fn create_user(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<NewUserRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    body.validate()?;

    let user = User::register(&app_state.db_pool, &app_state.auth_service, body.into_inner()).await?;
    let token = app_state.auth_service.create_token(&user.username, user.is_admin)?;
    info!("User '{}' (admin: {}) created by {}", user.username, user.is_admin, claims.sub);

    Ok(HttpResponse::Created().json(json!({ "user": user, "token": token })))
}

pub async fn get_user(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    ensure_correct_user_or_admin(&req, &path)?;

    let user = User::get(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

pub async fn update_user(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_correct_user_or_admin(&req, &path)?;
    body.validate()?;

    let user = User::update(&app_state.db_pool, &app_state.auth_service, &path, &body).await?;
    info!("User '{}' updated by {}", user.username, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

pub async fn delete_user(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_correct_user_or_admin(&req, &path)?;
    let username = path.into_inner();

    User::remove(&app_state.db_pool, &username).await?;
    info!("User '{}' deleted by {}", username, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "deleted": username })))
}

// src/auth_handlers.rs
//! Token issuing: login and self-registration.

use actix_web::{web, HttpResponse};
use log::{info, warn};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{LoginRequest, NewUserRequest, RegisterRequest, TokenResponse, User};
use crate::AppState;

/// `POST /auth/token`
pub async fn token(
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let user = User::authenticate(&app_state.db_pool, &app_state.auth_service, &body.username, &body.password)
        .await
        .map_err(|err| {
            warn!("Failed login attempt for '{}'", body.username);
            err
        })?;

    let token = app_state.auth_service.create_token(&user.username, user.is_admin)?;
    info!("User '{}' logged in", user.username);

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// `POST /auth/register`; new accounts are never admins.
pub async fn register(
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let request = NewUserRequest::from(body.into_inner());
    let user = User::register(&app_state.db_pool, &app_state.auth_service, request).await?;
    let token = app_state.auth_service.create_token(&user.username, user.is_admin)?;
    info!("User '{}' registered", user.username);

    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

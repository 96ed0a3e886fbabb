// src/auth.rs - JWT issuing/verification, password hashing, request authentication
use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::Header;
use actix_web::{web, HttpMessage, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// username
    pub sub: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

// ======== AUTH SERVICE ========

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiration_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            token_expiration_hours: config.token_expiration_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, self.bcrypt_cost)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
        verify(password, hash)
    }

    pub fn create_token(&self, username: &str, is_admin: bool) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_expiration_hours);

        let claims = Claims {
            sub: username.to_string(),
            is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&JwtHeader::default(), &claims, &self.encoding_key)
            .map_err(|_| ApiError::AuthError("Failed to generate token".to_string()))
    }

    pub fn verify_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::AuthError("Token expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    ApiError::AuthError("Invalid token".to_string())
                }
                _ => ApiError::AuthError("Token verification failed".to_string()),
            })
    }
}

// ======== AUTHORIZATION CHECKS ========

pub fn get_current_user(req: &HttpRequest) -> Option<Claims> {
    req.extensions().get::<Claims>().cloned()
}

/// Any valid token.
pub fn ensure_logged_in(req: &HttpRequest) -> ApiResult<Claims> {
    get_current_user(req).ok_or_else(|| ApiError::unauthorized("Login required"))
}

/// Valid token whose `is_admin` claim is true.
pub fn ensure_admin(req: &HttpRequest) -> ApiResult<Claims> {
    let claims = ensure_logged_in(req)?;
    if claims.is_admin {
        Ok(claims)
    } else {
        Err(ApiError::unauthorized("Admin required"))
    }
}

/// Valid token for `username` itself, or any admin.
pub fn ensure_correct_user_or_admin(req: &HttpRequest, username: &str) -> ApiResult<Claims> {
    let claims = ensure_logged_in(req)?;
    if claims.is_admin || claims.sub == username {
        Ok(claims)
    } else {
        Err(ApiError::unauthorized("Must be this user or an admin"))
    }
}

// ======== JWT MIDDLEWARE ========

/// Stores the claims of a valid `Authorization: Bearer` token in request
/// extensions. Missing or invalid tokens are ignored and the request goes on
/// anonymously; routes decide what access they require.
pub struct AuthenticateJwt;

impl<S, B> Transform<S, ServiceRequest> for AuthenticateJwt
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthenticateJwtMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateJwtMiddleware { service }))
    }
}

pub struct AuthenticateJwtMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticateJwtMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(claims) = authenticate(&req) {
            req.extensions_mut().insert(claims);
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

fn authenticate(req: &ServiceRequest) -> Option<Claims> {
    let bearer = Authorization::<Bearer>::parse(req).ok()?.into_scheme();

    let Some(auth_service) = req.app_data::<web::Data<Arc<AuthService>>>() else {
        log::error!("AuthService not found in app data");
        return None;
    };

    match auth_service.verify_token(bearer.token()) {
        Ok(claims) => Some(claims),
        Err(err) => {
            log::debug!("Ignoring bearer token: {}", err);
            None
        }
    }
}

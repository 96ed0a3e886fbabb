// src/main.rs
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use sqlx::PgPool;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod auth_handlers;
mod company_handlers;
mod config;
mod db;
mod error;
mod job_handlers;
mod models;
mod query_builders;
mod user_handlers;

#[cfg(test)]
mod test_support;

use crate::auth::{AuthService, AuthenticateJwt};
use crate::config::{generate_secret, Config};
use crate::error::{json_error_handler, query_error_handler};
use crate::models::{NewUserRequest, User};

pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: Arc<AuthService>,
}

// ==================== EXTRACTOR CONFIG ====================

/// Malformed bodies, wrong types and unknown fields become 400s with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

// ==================== ROUTES ====================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
        .service(
            web::scope("/auth")
                .route("/token", web::post().to(auth_handlers::token))
                .route("/register", web::post().to(auth_handlers::register))
        )
        .service(
            web::scope("/companies")
                .route("", web::get().to(company_handlers::list_companies))
                .route("", web::post().to(company_handlers::create_company))
                .route("/{handle}", web::get().to(company_handlers::get_company))
                .route("/{handle}", web::patch().to(company_handlers::update_company))
                .route("/{handle}", web::delete().to(company_handlers::delete_company))
        )
        .service(
            web::scope("/jobs")
                .route("", web::get().to(job_handlers::list_jobs))
                .route("", web::post().to(job_handlers::create_job))
                .route("/{id}", web::get().to(job_handlers::get_job))
                .route("/{id}", web::patch().to(job_handlers::update_job))
                .route("/{id}", web::delete().to(job_handlers::delete_job))
        )
        .service(
            web::scope("/users")
                .route("", web::get().to(user_handlers::list_users))
                .route("", web::post().to(user_handlers::create_user))
                .route("/{username}", web::get().to(user_handlers::get_user))
                .route("/{username}", web::patch().to(user_handlers::update_user))
                .route("/{username}", web::delete().to(user_handlers::delete_user))
        );
}

// ==================== SETUP ====================

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to install logger")?;

    Ok(())
}

pub fn setup_cors(allowed_origins: &[String], is_production: bool) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        if is_production {
            log::error!("Wildcard CORS origin ignored in production; set ALLOWED_ORIGINS explicitly");
        } else {
            log::warn!("Using wildcard CORS (*) in development mode");
            return cors.allow_any_origin();
        }
    }

    for origin in allowed_origins.iter().filter(|o| !o.is_empty() && o.as_str() != "*") {
        cors = cors.allowed_origin(origin);
    }

    cors
}

fn setup_security_headers(config: &crate::config::SecurityConfig) -> DefaultHeaders {
    let mut headers = DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"));

    if config.require_https {
        headers = headers.add((
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains",
        ));
    }

    headers
}

/// Creates an `admin` account on an empty users table so the API is usable
/// after a fresh install.
async fn create_default_admin_if_needed(pool: &PgPool, auth_service: &AuthService) -> anyhow::Result<()> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count > 0 {
        return Ok(());
    }

    let (password, generated) = match env::var("DEFAULT_ADMIN_PASSWORD") {
        Ok(password) => (password, false),
        Err(_) => (generate_secret().chars().take(16).collect::<String>(), true),
    };

    let admin = NewUserRequest {
        username: "admin".to_string(),
        password: password.clone(),
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: "admin@jobly.local".to_string(),
        is_admin: true,
    };

    User::register(pool, auth_service, admin)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create default admin user: {}", e))?;

    log::warn!("Default admin user created:");
    log::warn!("  Username: admin");
    if generated {
        log::warn!("  Password: {} (generated, change it immediately)", password);
    }

    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    setup_logging(&config)?;
    config.print_startup_info();

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let auth_service = Arc::new(AuthService::new(&config.auth));
    create_default_admin_if_needed(&pool, &auth_service).await?;

    let app_state = Arc::new(AppState {
        db_pool: pool,
        auth_service: auth_service.clone(),
    });

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Starting server at http://{}", bind_address);

    let is_production = config.is_production();
    let server_config = config.clone();

    let mut server = HttpServer::new(move || {
        let cors = setup_cors(&server_config.security.allowed_origins, is_production);
        let security_headers = setup_security_headers(&server_config.security);

        App::new()
            .wrap(AuthenticateJwt)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(security_headers)
            .wrap(cors)
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(json_config().limit(server_config.security.max_request_size))
            .app_data(query_config())
            .configure(configure_routes)
    })
        .keep_alive(std::time::Duration::from_secs(config.server.keep_alive))
        .client_request_timeout(std::time::Duration::from_secs(config.server.client_timeout));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server failed to run")?;

    Ok(())
}

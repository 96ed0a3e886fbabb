// src/test_support.rs - Shared fixture for database-backed tests
//
// Set TEST_DATABASE_URL to a disposable PostgreSQL database to run them;
// without it those tests print a notice and return early.

use std::sync::Arc;

use lazy_static::lazy_static;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::{Mutex, MutexGuard};

use crate::auth::AuthService;
use crate::config::AuthConfig;
use crate::{db, AppState};

lazy_static! {
    static ref DB_LOCK: Mutex<()> = Mutex::new(());
}

pub const TEST_SECRET: &str = "jobly-test-secret-key-0123456789abcdef";

pub fn test_auth() -> AuthService {
    AuthService::new(&AuthConfig {
        secret_key: TEST_SECRET.to_string(),
        token_expiration_hours: 1,
        bcrypt_cost: 4,
    })
}

pub fn state_with(pool: PgPool, auth_service: Arc<AuthService>) -> Arc<AppState> {
    Arc::new(AppState { db_pool: pool, auth_service })
}

/// App state whose pool never connects, for routes that fail before any query.
/// Must be called inside a runtime.
pub fn lazy_state() -> Arc<AppState> {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/jobly_unreachable")
        .expect("lazy pool");
    state_with(pool, Arc::new(test_auth()))
}

/// Builds the full application (middleware, extractor config and routes)
/// around an `Arc<AppState>` and starts it as a test service.
macro_rules! init_test_app {
    ($state:expr) => {{
        let state: std::sync::Arc<crate::AppState> = $state;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state.auth_service.clone()))
                .app_data(actix_web::web::Data::new(state))
                .app_data(crate::json_config())
                .app_data(crate::query_config())
                .wrap(crate::auth::AuthenticateJwt)
                .configure(crate::configure_routes),
        )
    }};
}
pub(crate) use init_test_app;

/// Exclusive handle on the test database, reseeded on acquisition.
pub struct TestDb {
    pub pool: PgPool,
    pub auth: Arc<AuthService>,
    _guard: MutexGuard<'static, ()>,
}

impl TestDb {
    pub async fn acquire() -> Option<TestDb> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("Skipping: TEST_DATABASE_URL not set");
            return None;
        };

        let guard = DB_LOCK.lock().await;

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to TEST_DATABASE_URL");
        db::run_migrations(&pool).await.expect("run migrations");

        let auth = Arc::new(test_auth());
        seed(&pool, &auth).await;

        Some(TestDb { pool, auth, _guard: guard })
    }

    /// App state over this database, sharing its token signer.
    pub fn state(&self) -> Arc<AppState> {
        state_with(self.pool.clone(), self.auth.clone())
    }
}

async fn seed(pool: &PgPool, auth: &AuthService) {
    sqlx::query("TRUNCATE jobs, companies, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("truncate tables");

    sqlx::query(
        r#"INSERT INTO companies (handle, name, num_employees, description, logo_url)
           VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                  ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                  ('c3', 'C3', 3, 'Desc3', 'http://c3.img')"#,
    )
        .execute(pool)
        .await
        .expect("seed companies");

    sqlx::query(
        r#"INSERT INTO jobs (title, salary, equity, company_handle)
           VALUES ('job1', 10000, 0.5, 'c1'),
                  ('job2', 11000, 0.3141592653, 'c2'),
                  ('job3', 12000, 0.99, 'c3')"#,
    )
        .execute(pool)
        .await
        .expect("seed jobs");

    let users = [
        ("test", "password", "Test", "Tester", "test@test.com", false),
        ("test2", "password2", "Test2", "Tester2", "test2@test.com", false),
        ("admin", "password3", "admin", "admin", "admin@test.com", true),
    ];
    for (username, password, first_name, last_name, email, is_admin) in users {
        sqlx::query(
            r#"INSERT INTO users (username, password, first_name, last_name, email, is_admin)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
            .bind(username)
            .bind(auth.hash_password(password).expect("hash password"))
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(is_admin)
            .execute(pool)
            .await
            .expect("seed users");
    }
}

// src/config.rs - Configuration: defaults, environment overrides, validation
use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Set by `JOBLY_ENV=production`.
    pub production: bool,
    pub workers: Option<usize>,
    pub keep_alive: u64,
    pub client_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
    pub max_request_size: usize,
    pub require_https: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Signing key used when `SECRET_KEY` is unset. Refused in production.
pub const DEV_SECRET_KEY: &str = "development-secret-key-change-me-0123";

// Test-friendly defaults; nothing here reads the environment.
impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            token_expiration_hours: 24,
            bcrypt_cost: 12,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            production: false,
            workers: None,
            keep_alive: 30,
            client_timeout: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql:///jobly".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_request_size: 256 * 1024,
            require_https: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Random 64-char alphanumeric string, used for generated admin passwords.
pub fn generate_secret() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

impl Config {
    /// `.env` file, then defaults overridden by the process environment, then validation.
    pub fn load() -> Result<Self> {
        load_env_file()?;

        let mut config = Config::default();
        config.override_with(|key| env::var(key).ok())?;
        config.validate().context("Configuration validation failed")?;

        Ok(config)
    }

    /// Applies overrides from `lookup`. A present but unparsable value is an error.
    fn override_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env_name) = lookup("JOBLY_ENV") {
            self.server.production = env_name == "production";
        }
        if let Some(host) = lookup("JOBLY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("JOBLY_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid JOBLY_PORT: {}", port))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max_conn) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = max_conn
                .parse()
                .with_context(|| format!("Invalid DB_MAX_CONNECTIONS: {}", max_conn))?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(hours) = lookup("JWT_EXPIRATION_HOURS") {
            self.auth.token_expiration_hours = hours
                .parse()
                .with_context(|| format!("Invalid JWT_EXPIRATION_HOURS: {}", hours))?;
        }
        if let Some(cost) = lookup("BCRYPT_WORK_FACTOR") {
            self.auth.bcrypt_cost = cost
                .parse()
                .with_context(|| format!("Invalid BCRYPT_WORK_FACTOR: {}", cost))?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.security.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(flag) = lookup("REQUIRE_HTTPS") {
            self.security.require_https = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.len() < 32 {
            return Err(anyhow::anyhow!(
                "SECRET_KEY must be at least 32 characters long (current: {})",
                self.auth.secret_key.len()
            ));
        }

        if self.server.production && self.auth.secret_key == DEV_SECRET_KEY {
            return Err(anyhow::anyhow!(
                "SECRET_KEY must be set in production; the development key is public"
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow::anyhow!(
                "BCRYPT_WORK_FACTOR must be between 4 and 31 (current: {})",
                self.auth.bcrypt_cost
            ));
        }

        if self.auth.token_expiration_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRATION_HOURS must be positive"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("max_connections must be at least 1"));
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(anyhow::anyhow!(
                "max_connections ({}) must be >= min_connections ({})",
                self.database.max_connections,
                self.database.min_connections
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.production
    }

    pub fn print_startup_info(&self) {
        log::info!("Jobly starting up");
        log::info!("Server: {}:{}", self.server.host, self.server.port);
        log::info!("Database: PostgreSQL (pool max {})", self.database.max_connections);
        log::info!("Auth: JWT ({}h expiration), bcrypt cost {}",
            self.auth.token_expiration_hours, self.auth.bcrypt_cost);
        log::info!("Logging: {} level", self.logging.level);

        if !self.is_production() {
            log::warn!("Running in development mode");
        }

        if self.security.require_https {
            log::info!("HTTPS enforcement enabled");
        } else if self.is_production() {
            log::warn!("HTTPS not required in production mode");
        }
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}

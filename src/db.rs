// src/db.rs - Connection pool and schema setup

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .connect(&config.url)
        .await
        .with_context(|| "Failed to connect to PostgreSQL")
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
            name TEXT UNIQUE NOT NULL,
            num_employees INTEGER CHECK (num_employees >= 0),
            description TEXT NOT NULL,
            logo_url TEXT
        )
        "#,
    )
        .execute(pool)
        .await
        .context("Failed to create companies table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id SERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            salary INTEGER CHECK (salary >= 0),
            equity NUMERIC CHECK (equity <= 1.0),
            company_handle VARCHAR(25) NOT NULL
                REFERENCES companies ON DELETE CASCADE
        )
        "#,
    )
        .execute(pool)
        .await
        .context("Failed to create jobs table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username VARCHAR(25) PRIMARY KEY,
            password TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL CHECK (position('@' IN email) > 1),
            is_admin BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
        .execute(pool)
        .await
        .context("Failed to create users table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_company_handle ON jobs (company_handle)")
        .execute(pool)
        .await?;

    log::info!("Database migrations completed");
    Ok(())
}

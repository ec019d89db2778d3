// PostgreSQL user backend

use crate::backend::service::UserBackend;
use crate::core::config::DatabaseConfig;
use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

const INSERT_USER: &str =
    "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id";
const SELECT_USER: &str = "SELECT id, name, email, password FROM users WHERE id = $1";
const UPDATE_USER: &str = "UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4";
const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

/// Open a connection pool and check it with a first connection
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .connect(&config.url)
        .await
        .context("Failed to connect to PostgreSQL")
}

/// User backend running one parameterized statement per call against PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserBackend for PostgresBackend {
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<i64, BackendError> {
        ctx.run(async {
            let id: i64 = sqlx::query_scalar(INSERT_USER)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password)
                .fetch_one(&self.pool)
                .await?;
            debug!(user_id = id, "Inserted user");
            Ok::<_, BackendError>(id)
        })
        .await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError> {
        ctx.run(async {
            sqlx::query_as::<_, User>(SELECT_USER)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(BackendError::NotFound(id))
        })
        .await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, user: User) -> Result<(), BackendError> {
        ctx.run(async {
            let result = sqlx::query(UPDATE_USER)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password)
                .bind(id)
                .execute(&self.pool)
                .await?;
            // Zero affected rows is still reported as success
            debug!(user_id = id, rows_affected = result.rows_affected(), "Updated user");
            Ok::<_, BackendError>(())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), BackendError> {
        ctx.run(async {
            let result = sqlx::query(DELETE_USER)
                .bind(id)
                .execute(&self.pool)
                .await?;
            debug!(user_id = id, rows_affected = result.rows_affected(), "Deleted user");
            Ok::<_, BackendError>(())
        })
        .await
    }
}

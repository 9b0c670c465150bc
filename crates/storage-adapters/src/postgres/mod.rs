//! # PostgreSQL adapter
//!
//! Runtime-checked sqlx queries; no `DATABASE_URL` is needed at compile time.
//! Counter columns are maintained by triggers in `migrations/`.

mod comments;
mod products;
mod profiles;
mod upvotes;

use std::time::Duration;

use domains::DomainError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("migrations applied");
        Ok(())
    }
}

/// Driver error → domain error. Constraint codes get their own variants.
pub(crate) fn map_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return DomainError::Conflict(db.message().to_string()),
            Some(FOREIGN_KEY_VIOLATION) => return DomainError::NotFound("referenced row"),
            _ => {}
        }
    }
    error!(%err, "database error");
    DomainError::internal("Something went wrong. Please try again.")
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Result, Upvote, UpvoteRepository};
use uuid::Uuid;

use super::{map_err, PgStore};

#[async_trait]
impl UpvoteRepository for PgStore {
    /// The (user_id, product_id) primary key rejects duplicates with `23505`.
    async fn insert(&self, user_id: Uuid, product_id: Uuid) -> Result<Upvote> {
        let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
            "INSERT INTO upvotes (user_id, product_id) VALUES ($1, $2) RETURNING created_at",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(Upvote {
            user_id,
            product_id,
            created_at,
        })
    }

    async fn delete(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM upvotes WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn exists(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM upvotes WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(exists)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    Author, Comment, CommentRepository, CommentWithAuthor, DomainError, NewComment, Result,
};
use uuid::Uuid;

use super::{map_err, PgStore};

const COLUMNS: &str =
    "id, product_id, user_id, parent_id, content, is_flagged, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    is_flagged: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            parent_id: row.parent_id,
            content: row.content,
            is_flagged: row.is_flagged,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthoredRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_name: Option<String>,
    author_avatar: Option<String>,
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let row: CommentRow = sqlx::query_as(&format!(
            "INSERT INTO comments \
             (id, product_id, user_id, parent_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(comment.product_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let row: Option<CommentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM comments WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err)?;
        Ok(row.map(Comment::from))
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let rows: Vec<AuthoredRow> = sqlx::query_as(
            "SELECT c.id, c.product_id, c.user_id, c.parent_id, c.content, c.is_flagged, \
                    c.created_at, c.updated_at, \
                    p.name AS author_name, p.avatar_url AS author_avatar \
             FROM comments c LEFT JOIN profiles p ON p.id = c.user_id \
             WHERE c.product_id = $1 \
             ORDER BY c.created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(rows
            .into_iter()
            .map(|row| CommentWithAuthor {
                comment: row.comment.into(),
                author: Author {
                    name: row.author_name.unwrap_or_else(|| "User".to_string()),
                    avatar_url: row.author_avatar,
                },
            })
            .collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        updated_at: DateTime<Utc>,
    ) -> Result<Comment> {
        let row: Option<CommentRow> = sqlx::query_as(&format!(
            "UPDATE comments SET content = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&content)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.map(Comment::from).ok_or(DomainError::NotFound("comment"))
    }

    /// `parent_id ... ON DELETE CASCADE` removes the replies.
    async fn delete(&self, id: Uuid) -> Result<()> {
        let done = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::NotFound("comment"));
        }
        Ok(())
    }

    async fn set_flagged(&self, id: Uuid) -> Result<()> {
        let done = sqlx::query("UPDATE comments SET is_flagged = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::NotFound("comment"));
        }
        Ok(())
    }
}

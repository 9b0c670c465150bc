use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{NewProduct, Product, ProductRepository, Result};
use uuid::Uuid;

use super::{map_err, PgStore};

const COLUMNS: &str = "id, name, tagline, description, website_url, repo_url, logo_url, demo_url, \
    pricing_model, promo_code, tags, twitter_url, linkedin_url, product_hunt_url, platforms, \
    user_id, upvotes_count, comments_count, views_count, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    tagline: String,
    description: String,
    website_url: String,
    repo_url: Option<String>,
    logo_url: Option<String>,
    demo_url: Option<String>,
    pricing_model: String,
    promo_code: Option<String>,
    tags: Vec<String>,
    twitter_url: Option<String>,
    linkedin_url: Option<String>,
    product_hunt_url: Option<String>,
    platforms: Vec<String>,
    user_id: Uuid,
    upvotes_count: i64,
    comments_count: i64,
    views_count: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = domains::DomainError;

    fn try_from(row: ProductRow) -> Result<Self> {
        Ok(Product {
            id: row.id,
            name: row.name,
            tagline: row.tagline,
            description: row.description,
            website_url: row.website_url,
            repo_url: row.repo_url,
            logo_url: row.logo_url,
            demo_url: row.demo_url,
            pricing_model: row.pricing_model.parse()?,
            promo_code: row.promo_code,
            tags: row.tags,
            twitter_url: row.twitter_url,
            linkedin_url: row.linkedin_url,
            product_hunt_url: row.product_hunt_url,
            platforms: row
                .platforms
                .iter()
                .map(|p| p.parse())
                .collect::<Result<_>>()?,
            user_id: row.user_id,
            upvotes_count: row.upvotes_count,
            comments_count: row.comments_count,
            views_count: row.views_count,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert(&self, product: NewProduct) -> Result<Product> {
        let platforms: Vec<&str> = product.platforms.iter().map(|p| p.as_str()).collect();
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (id, name, tagline, description, website_url, repo_url, \
             logo_url, demo_url, pricing_model, promo_code, tags, twitter_url, linkedin_url, \
             product_hunt_url, platforms, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $17) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(&product.tagline)
        .bind(&product.description)
        .bind(&product.website_url)
        .bind(&product.repo_url)
        .bind(&product.logo_url)
        .bind(&product.demo_url)
        .bind(product.pricing_model.as_str())
        .bind(&product.promo_code)
        .bind(&product.tags)
        .bind(&product.twitter_url)
        .bind(&product.linkedin_url)
        .bind(&product.product_hunt_url)
        .bind(&platforms)
        .bind(product.user_id)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err)?;
        row.map(Product::try_from).transpose()
    }

    async fn list_created_since(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM products \
             WHERE status = 'published' AND created_at >= $1 \
             ORDER BY upvotes_count DESC, created_at DESC \
             LIMIT $2"
        ))
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE products SET views_count = views_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

impl PgStore {
    /// The maker's product with exactly this name, if one exists.
    pub async fn find_product_named(&self, user_id: Uuid, name: &str) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM products WHERE user_id = $1 AND name = $2 \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.map(Product::try_from).transpose()
    }
}

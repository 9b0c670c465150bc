//! In-memory storage backed by `DashMap`.
//!
//! A single `MemoryStore` implements every repository port, so one
//! `Arc<MemoryStore>` can be handed out as each `Arc<dyn ...Repository>`.
//! Never hold a guard into one map while writing to the same map.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    Author, Comment, CommentRepository, CommentWithAuthor, Credentials, DomainError, NewComment,
    NewProduct, Product, ProductRepository, ProductStatus, Profile, ProfileRepository, Result,
    Upvote, UpvoteRepository,
};
use tracing::debug;
use uuid::Uuid;

/// Same wording the PostgreSQL driver reports for code `23505`.
const UNIQUE_VIOLATION: &str = "duplicate key value violates unique constraint";

#[derive(Default)]
pub struct MemoryStore {
    products: DashMap<Uuid, Product>,
    upvotes: DashMap<(Uuid, Uuid), Upvote>,
    comments: DashMap<Uuid, Comment>,
    profiles: DashMap<Uuid, Credentials>,
    emails: DashMap<String, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn adjust_product(&self, id: Uuid, f: impl FnOnce(&mut Product)) {
        if let Some(mut product) = self.products.get_mut(&id) {
            f(&mut product);
        }
    }

    fn author_of(&self, user_id: Uuid) -> Author {
        self.profiles
            .get(&user_id)
            .map(|c| c.profile.author())
            .unwrap_or_else(|| Author {
                name: "User".to_string(),
                avatar_url: None,
            })
    }

    /// The comment and all of its descendants.
    fn subtree(&self, root: Uuid) -> HashSet<Uuid> {
        let mut ids = HashSet::from([root]);
        loop {
            let before = ids.len();
            for entry in self.comments.iter() {
                if let Some(parent) = entry.parent_id {
                    if ids.contains(&parent) {
                        ids.insert(entry.id);
                    }
                }
            }
            if ids.len() == before {
                return ids;
            }
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert(&self, product: NewProduct) -> Result<Product> {
        let product = product.into_product(Uuid::new_v4());
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn list_created_since(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.status == ProductStatus::Published && p.created_at >= cutoff)
            .map(|p| p.clone())
            .collect();
        products.sort_by(|a, b| {
            b.upvotes_count
                .cmp(&a.upvotes_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        products.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(products)
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        self.adjust_product(id, |p| p.views_count += 1);
        Ok(())
    }
}

#[async_trait]
impl UpvoteRepository for MemoryStore {
    async fn insert(&self, user_id: Uuid, product_id: Uuid) -> Result<Upvote> {
        if !self.products.contains_key(&product_id) {
            return Err(DomainError::NotFound("product"));
        }
        let upvote = match self.upvotes.entry((user_id, product_id)) {
            Entry::Occupied(_) => return Err(DomainError::Conflict(UNIQUE_VIOLATION.to_string())),
            Entry::Vacant(slot) => slot
                .insert(Upvote {
                    user_id,
                    product_id,
                    created_at: Utc::now(),
                })
                .clone(),
        };
        self.adjust_product(product_id, |p| p.upvotes_count += 1);
        Ok(upvote)
    }

    async fn delete(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
        let removed = self.upvotes.remove(&(user_id, product_id)).is_some();
        if removed {
            self.adjust_product(product_id, |p| p.upvotes_count = (p.upvotes_count - 1).max(0));
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
        Ok(self.upvotes.contains_key(&(user_id, product_id)))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        if !self.products.contains_key(&comment.product_id) {
            return Err(DomainError::NotFound("product"));
        }
        if let Some(parent) = comment.parent_id {
            if !self.comments.contains_key(&parent) {
                return Err(DomainError::NotFound("comment"));
            }
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            product_id: comment.product_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            content: comment.content,
            is_flagged: false,
            created_at: comment.created_at,
            updated_at: comment.created_at,
        };
        self.comments.insert(comment.id, comment.clone());
        self.adjust_product(comment.product_id, |p| p.comments_count += 1);
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let mut rows: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.product_id == product_id)
            .map(|c| c.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .map(|comment| CommentWithAuthor {
                author: self.author_of(comment.user_id),
                comment,
            })
            .collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        updated_at: DateTime<Utc>,
    ) -> Result<Comment> {
        let mut comment = self
            .comments
            .get_mut(&id)
            .ok_or(DomainError::NotFound("comment"))?;
        comment.content = content;
        comment.updated_at = updated_at;
        Ok(comment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let Some(product_id) = self.comments.get(&id).map(|c| c.product_id) else {
            return Err(DomainError::NotFound("comment"));
        };
        let removed = self
            .subtree(id)
            .into_iter()
            .filter(|doomed| self.comments.remove(doomed).is_some())
            .count() as i64;
        debug!(%id, removed, "comment subtree removed");
        self.adjust_product(product_id, |p| p.comments_count = (p.comments_count - removed).max(0));
        Ok(())
    }

    async fn set_flagged(&self, id: Uuid) -> Result<()> {
        let mut comment = self
            .comments
            .get_mut(&id)
            .ok_or(DomainError::NotFound("comment"))?;
        comment.is_flagged = true;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.profiles.get(&id).map(|c| c.profile.clone()))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.profiles.get(&id).map(|c| c.clone()))
    }

    async fn insert(&self, profile: Profile, password_hash: String) -> Result<()> {
        if let Some(email) = &profile.email {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => {
                    return Err(DomainError::Conflict(UNIQUE_VIOLATION.to_string()))
                }
                Entry::Vacant(slot) => {
                    slot.insert(profile.id);
                }
            }
        }
        self.profiles.insert(
            profile.id,
            Credentials {
                profile,
                password_hash,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::PricingModel;

    fn new_product(name: &str, created_at: DateTime<Utc>) -> NewProduct {
        NewProduct {
            name: name.into(),
            tagline: "tagline".into(),
            description: "description".into(),
            website_url: "https://example.com".into(),
            repo_url: None,
            logo_url: None,
            demo_url: None,
            pricing_model: PricingModel::Free,
            promo_code: None,
            tags: vec!["tools".into()],
            twitter_url: None,
            linkedin_url: None,
            product_hunt_url: None,
            platforms: vec![],
            user_id: Uuid::new_v4(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_upvote_uniqueness_and_counter() {
        let store = MemoryStore::new();
        let product = ProductRepository::insert(&store, new_product("a", Utc::now()))
            .await
            .unwrap();
        let user = Uuid::new_v4();

        UpvoteRepository::insert(&store, user, product.id).await.unwrap();
        let dup = UpvoteRepository::insert(&store, user, product.id).await;
        assert!(matches!(dup, Err(DomainError::Conflict(_))));

        let stored = ProductRepository::find_by_id(&store, product.id).await.unwrap().unwrap();
        assert_eq!(stored.upvotes_count, 1);

        assert!(UpvoteRepository::delete(&store, user, product.id).await.unwrap());
        assert!(!UpvoteRepository::delete(&store, user, product.id).await.unwrap());
        let stored = ProductRepository::find_by_id(&store, product.id).await.unwrap().unwrap();
        assert_eq!(stored.upvotes_count, 0);
    }

    #[tokio::test]
    async fn test_list_created_since_filters_and_orders() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let old = ProductRepository::insert(&store, new_product("old", now - Duration::days(3)))
            .await
            .unwrap();
        let quiet = ProductRepository::insert(&store, new_product("quiet", now)).await.unwrap();
        let loud = ProductRepository::insert(&store, new_product("loud", now - Duration::hours(1)))
            .await
            .unwrap();
        UpvoteRepository::insert(&store, Uuid::new_v4(), loud.id).await.unwrap();
        UpvoteRepository::insert(&store, Uuid::new_v4(), old.id).await.unwrap();

        let listed = store
            .list_created_since(now - Duration::days(1), 5)
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["loud", "quiet"]);
        assert_eq!(listed[1].id, quiet.id);

        assert_eq!(store.list_created_since(now - Duration::days(7), 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_delete_cascades() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let product = ProductRepository::insert(&store, new_product("a", now)).await.unwrap();
        let user = Uuid::new_v4();
        let comment = |parent_id| NewComment {
            product_id: product.id,
            user_id: user,
            parent_id,
            content: "hi".into(),
            created_at: now,
        };

        let root = CommentRepository::insert(&store, comment(None)).await.unwrap();
        let reply = CommentRepository::insert(&store, comment(Some(root.id))).await.unwrap();
        CommentRepository::insert(&store, comment(Some(reply.id))).await.unwrap();
        let other = CommentRepository::insert(&store, comment(None)).await.unwrap();

        CommentRepository::delete(&store, root.id).await.unwrap();

        let left = store.list_for_product(product.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].comment.id, other.id);
        let stored = ProductRepository::find_by_id(&store, product.id).await.unwrap().unwrap();
        assert_eq!(stored.comments_count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        let profile = |email: &str| Profile {
            id: Uuid::new_v4(),
            name: None,
            avatar_url: None,
            email: Some(email.to_string()),
        };
        ProfileRepository::insert(&store, profile("a@b.io"), "h".into()).await.unwrap();
        let dup = ProfileRepository::insert(&store, profile("a@b.io"), "h".into()).await;
        assert!(matches!(dup, Err(DomainError::Conflict(_))));
        assert!(store.find_credentials("a@b.io").await.unwrap().is_some());
    }
}

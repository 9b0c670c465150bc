//! # Ports
//!
//! Any storage or auth adapter must implement these traits to be used by the
//! services. Storage adapters own the invariants the database would normally
//! enforce: upvote uniqueness, counter maintenance and comment cascades.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
    Comment, CommentWithAuthor, Credentials, NewComment, NewProduct, Product, Profile, Upvote,
};

/// Persistence contract for products.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: NewProduct) -> Result<Product>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    /// Published products with `created_at >= cutoff`, most upvoted first.
    async fn list_created_since(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<Product>>;
    async fn increment_views(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for the (user, product) upvote pairs.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UpvoteRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the pair already exists.
    async fn insert(&self, user_id: Uuid, product_id: Uuid) -> Result<Upvote>;
    /// Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid, product_id: Uuid) -> Result<bool>;
    async fn exists(&self, user_id: Uuid, product_id: Uuid) -> Result<bool>;
}

/// Persistence contract for comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Flat rows for one product, newest first.
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<CommentWithAuthor>>;
    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        updated_at: DateTime<Utc>,
    ) -> Result<Comment>;
    /// Removes the comment and every reply below it.
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn set_flagged(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for profiles and their credentials.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>>;
    /// Fails with `DomainError::Conflict` on a duplicate email.
    async fn insert(&self, profile: Profile, password_hash: String) -> Result<()>;
}

/// One-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Issues and checks the opaque token stored in the session cookie.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String>;
    /// Returns the user id the token was issued for.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid>;
}

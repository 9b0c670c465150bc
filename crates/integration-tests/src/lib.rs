//! Shared fixtures: every service wired over one [`MemoryStore`].

use std::sync::Arc;

use auth_adapters::{Argon2Hasher, JwtSessionIssuer};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use domains::{Product, Profile};
use services::{CommentService, ProductDraft, ProductService, SessionService, UpvoteService};
use storage_adapters::MemoryStore;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse";
const JWT_SECRET: &[u8] = b"integration-test-secret";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub products: Arc<ProductService>,
    pub upvotes: Arc<UpvoteService>,
    pub comments: Arc<CommentService>,
    pub sessions: Arc<SessionService>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_depth(3)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let upvotes = Arc::new(UpvoteService::new(store.clone()));
        let comments = Arc::new(CommentService::new(store.clone(), store.clone(), max_depth));
        let products = Arc::new(ProductService::new(
            store.clone(),
            upvotes.clone(),
            comments.clone(),
            5,
            FixedOffset::east_opt(0).expect("zero offset"),
        ));
        let sessions = Arc::new(SessionService::new(
            store.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(JwtSessionIssuer::new(JWT_SECRET, Duration::hours(1))),
        ));
        Self {
            store,
            products,
            upvotes,
            comments,
            sessions,
        }
    }

    /// Registers `{first name}@example.com` with [`PASSWORD`].
    pub async fn user(&self, name: &str) -> Profile {
        let local = name.split_whitespace().next().unwrap_or("user").to_lowercase();
        self.sessions
            .register(name, &format!("{local}@example.com"), PASSWORD, None)
            .await
            .expect("register user")
    }

    pub async fn product(&self, maker: Uuid, name: &str, created_at: DateTime<Utc>) -> Product {
        self.products
            .submit(Some(maker), draft(name), created_at)
            .await
            .expect("submit product")
    }

    pub async fn upvote(&self, user: Uuid, product: Uuid) {
        self.upvotes
            .toggle(Some(user), product, false)
            .await
            .expect("upvote");
    }

    #[cfg(feature = "web-axum")]
    pub fn app(&self) -> axum::Router {
        api_adapters::router(api_adapters::AppState {
            products: self.products.clone(),
            upvotes: self.upvotes.clone(),
            comments: self.comments.clone(),
            sessions: self.sessions.clone(),
            metrics: Arc::new(api_adapters::Metrics::new()),
            cookies: api_adapters::CookiePolicy {
                secure: false,
                session_ttl: Duration::hours(1),
            },
        })
    }
}

/// A draft that passes validation.
pub fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        tagline: format!("{name} does one thing well"),
        website_url: "https://example.com".to_string(),
        description: format!(
            "{name} is a small, focused tool built by an indie maker for other makers."
        ),
        tags: vec!["productivity".to_string()],
        pricing_model: "free".to_string(),
        ..ProductDraft::default()
    }
}

use std::sync::Arc;

use chrono::Duration;
use services::{CommentService, ProductService, SessionService, UpvoteService};

use crate::metrics::Metrics;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub upvotes: Arc<UpvoteService>,
    pub comments: Arc<CommentService>,
    pub sessions: Arc<SessionService>,
    pub metrics: Arc<Metrics>,
    pub cookies: CookiePolicy,
}

#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub session_ttl: Duration,
}

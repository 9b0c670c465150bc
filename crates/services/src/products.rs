//! Leaderboards, product detail and submission.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use domains::{DomainError, Product, ProductRepository, ProductWindow, Result};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::comments::{CommentNode, CommentService};
use crate::upvotes::UpvoteService;
use crate::validation::ProductDraft;

/// One home page section.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub window: ProductWindow,
    pub products: Vec<Product>,
}

impl Leaderboard {
    pub fn title(&self) -> &'static str {
        self.window.title()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    /// Always false for anonymous viewers
    pub is_upvoted: bool,
    pub comments: Vec<CommentNode>,
}

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    upvotes: Arc<UpvoteService>,
    comments: Arc<CommentService>,
    limit: i64,
    offset: FixedOffset,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        upvotes: Arc<UpvoteService>,
        comments: Arc<CommentService>,
        limit: i64,
        offset: FixedOffset,
    ) -> Self {
        Self {
            products,
            upvotes,
            comments,
            limit,
            offset,
        }
    }

    /// Top products created at or after the window's cutoff.
    #[instrument(skip(self))]
    pub async fn top_products(
        &self,
        window: ProductWindow,
        now: DateTime<Utc>,
    ) -> Result<Leaderboard> {
        let cutoff = window.cutoff(now.with_timezone(&self.offset));
        let products = self.products.list_created_since(cutoff, self.limit).await?;
        Ok(Leaderboard { window, products })
    }

    /// All four windows in display order.
    pub async fn home(&self, now: DateTime<Utc>) -> Result<Vec<Leaderboard>> {
        let mut boards = Vec::with_capacity(ProductWindow::ALL.len());
        for window in ProductWindow::ALL {
            boards.push(self.top_products(window, now).await?);
        }
        Ok(boards)
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: Uuid, viewer: Option<Uuid>) -> Result<ProductDetail> {
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("product"))?;

        // A lost view is not worth failing the page over.
        match self.products.increment_views(id).await {
            Ok(()) => product.views_count += 1,
            Err(err) => warn!(%err, "failed to count product view"),
        }

        let is_upvoted = self.upvotes.is_upvoted(viewer, id).await?;
        let comments = self.comments.thread(id, viewer).await?;
        Ok(ProductDetail {
            product,
            is_upvoted,
            comments,
        })
    }

    #[instrument(skip(self, draft))]
    pub async fn submit(
        &self,
        viewer: Option<Uuid>,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Product> {
        let user_id = viewer
            .ok_or_else(|| DomainError::unauthorized("You must be logged in to submit a product"))?;
        let new_product = draft.validate(user_id, now)?;
        let product = self.products.insert(new_product).await?;
        info!(product_id = %product.id, "product submitted");
        Ok(product)
    }
}

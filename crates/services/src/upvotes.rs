//! Upvote toggling. Storage uniqueness arbitrates concurrent toggles; this
//! layer only picks insert or delete and translates the outcome.

use std::sync::Arc;

use domains::{DomainError, Result, UpvoteRepository};
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpvoteAction {
    Added,
    Removed,
}

impl UpvoteAction {
    pub fn message(self) -> &'static str {
        match self {
            Self::Added => "Upvoted!",
            Self::Removed => "Upvote removed",
        }
    }
}

pub struct UpvoteService {
    upvotes: Arc<dyn UpvoteRepository>,
}

impl UpvoteService {
    pub fn new(upvotes: Arc<dyn UpvoteRepository>) -> Self {
        Self { upvotes }
    }

    /// `is_upvoted` is the state the viewer saw when they pressed the button.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        viewer: Option<Uuid>,
        product_id: Uuid,
        is_upvoted: bool,
    ) -> Result<UpvoteAction> {
        let user_id = viewer
            .ok_or_else(|| DomainError::unauthorized("You must be logged in to upvote products"))?;

        if is_upvoted {
            self.upvotes.delete(user_id, product_id).await.map_err(|err| {
                error!(%err, "failed to remove upvote");
                DomainError::internal("Failed to remove upvote. Please try again.")
            })?;
            info!("upvote removed");
            return Ok(UpvoteAction::Removed);
        }

        match self.upvotes.insert(user_id, product_id).await {
            Ok(_) => {
                info!("upvote added");
                Ok(UpvoteAction::Added)
            }
            Err(DomainError::Conflict(_)) => Err(DomainError::Conflict(
                "You have already upvoted this product".to_string(),
            )),
            Err(err @ DomainError::NotFound(_)) => Err(err),
            Err(err) => {
                error!(%err, "failed to add upvote");
                Err(DomainError::internal("Failed to add upvote. Please try again."))
            }
        }
    }

    pub async fn is_upvoted(&self, viewer: Option<Uuid>, product_id: Uuid) -> Result<bool> {
        match viewer {
            Some(user_id) => self.upvotes.exists(user_id, product_id).await,
            None => Ok(false),
        }
    }
}

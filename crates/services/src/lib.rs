//! # services
//!
//! Use cases for SaasList. Each service owns `Arc`s of the ports it needs
//! and takes `now` explicitly so time-dependent behaviour stays testable.

pub mod comments;
pub mod products;
pub mod sessions;
pub mod upvotes;
pub mod validation;

pub use comments::{build_thread, flatten, CommentEntry, CommentNode, CommentService};
pub use products::{Leaderboard, ProductDetail, ProductService};
pub use sessions::SessionService;
pub use upvotes::{UpvoteAction, UpvoteService};
pub use validation::ProductDraft;

//! # domains
//!
//! Core entities, port traits and the error type shared by every SaasList
//! crate. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;
pub mod window;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
pub use window::ProductWindow;

//! # storage-adapters
//!
//! Implementations of the repository ports.
//!
//! - [`memory::MemoryStore`]: dashmap-backed, always compiled. Used by tests
//!   and by `database.backend = "memory"`.
//! - [`postgres::PgStore`]: sqlx over PostgreSQL (feature `db-postgres`).
//!
//! Both enforce the same invariants: one upvote per (user, product), product
//! counters tracking their rows, and comment deletes cascading to replies.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;

//! # DomainError
//!
//! Centralized error handling for SaasList.
//! Every port returns this type so adapters translate driver failures once.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource not found (e.g., Product, Comment, Profile)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Validation failure (e.g., description too short, too many tags)
    #[error("{0}")]
    Validation(String),

    /// Several fields of one submission failed validation, one message each
    #[error("{}", .0.join("; "))]
    InvalidFields(Vec<String>),

    /// No signed-in user, or the credentials did not match
    #[error("{0}")]
    Unauthorized(String),

    /// Signed in, but not allowed to touch this resource
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation (e.g., duplicate upvote)
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down). The message is shown to users,
    /// so adapters log driver details instead of embedding them.
    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl std::fmt::Display) -> Self {
        Self::Internal(msg.to_string())
    }
}

/// A specialized Result type for SaasList logic.
pub type Result<T> = std::result::Result<T, DomainError>;

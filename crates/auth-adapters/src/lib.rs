//! # auth-adapters
//!
//! Credential and session implementations of the domain auth ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtSessionIssuer;

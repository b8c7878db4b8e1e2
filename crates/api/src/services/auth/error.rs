//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

use super::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] teakspice_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("An account with this email already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Issuing the session token failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

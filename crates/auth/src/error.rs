use common::IdentityId;
use thiserror::Error;

/// Errors that can occur during authentication.
///
/// The variants exist for server-side logs; every user-visible mapping
/// collapses to a single undifferentiated rejection so callers cannot
/// probe which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The caller could not be authenticated.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The token was malformed, expired, or failed signature checks.
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The token referenced an identity that no longer exists.
    #[error("Unknown identity: {0}")]
    UnknownIdentity(IdentityId),

    /// Login was attempted with a wrong email or password.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

//! The credential authority: issues tokens at login, validates them on
//! request.

use common::IdentityId;

use crate::identity::{Identity, IdentityDirectory, PasswordVerifier};
use crate::token::TokenCodec;
use crate::{AuthError, Result};

/// Validates bearer tokens and issues them at login.
///
/// Validation is idempotent and side-effect-free, so duplicate or retried
/// requests are safe.
pub struct CredentialAuthority<D, V> {
    codec: TokenCodec,
    directory: D,
    verifier: V,
}

impl<D, V> CredentialAuthority<D, V>
where
    D: IdentityDirectory,
    V: PasswordVerifier,
{
    /// Creates a new credential authority.
    pub fn new(codec: TokenCodec, directory: D, verifier: V) -> Self {
        Self {
            codec,
            directory,
            verifier,
        }
    }

    /// Verifies a token and resolves the identity it encodes.
    #[tracing::instrument(skip(self, token))]
    pub async fn validate(&self, token: &str) -> Result<Identity> {
        let claims = self.codec.decode(token)?;
        let id = IdentityId::from_uuid(claims.sub);
        let record = self
            .directory
            .find(id)
            .await
            .ok_or(AuthError::UnknownIdentity(id))?;
        Ok(record.identity)
    }

    /// Checks credentials and issues a fresh token.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(Identity, String)> {
        let record = self
            .directory
            .find_by_email(email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verifier.verify(password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue(&record.identity)?;
        tracing::info!(user = %record.identity.email, "issued bearer token");
        Ok((record.identity, token))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::identity::{InMemoryDirectory, PlaintextVerifier};

    fn authority() -> (
        CredentialAuthority<InMemoryDirectory, PlaintextVerifier>,
        InMemoryDirectory,
    ) {
        let directory = InMemoryDirectory::new();
        let codec = TokenCodec::new("test-secret", Duration::minutes(15));
        let authority = CredentialAuthority::new(codec, directory.clone(), PlaintextVerifier);
        (authority, directory)
    }

    #[tokio::test]
    async fn login_then_validate_resolves_the_identity() {
        let (authority, directory) = authority();
        let identity = directory.add_user("a@b.com", "secret");

        let (login_identity, token) = authority.login("a@b.com", "secret").await.unwrap();
        assert_eq!(login_identity, identity);

        let validated = authority.validate(&token).await.unwrap();
        assert_eq!(validated, identity);
    }

    #[tokio::test]
    async fn validate_is_idempotent() {
        let (authority, directory) = authority();
        directory.add_user("a@b.com", "secret");
        let (_, token) = authority.login("a@b.com", "secret").await.unwrap();

        let first = authority.validate(&token).await.unwrap();
        let second = authority.validate(&token).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (authority, directory) = authority();
        directory.add_user("a@b.com", "secret");

        let result = authority.login("a@b.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_email_is_rejected() {
        let (authority, _) = authority();
        let result = authority.login("nobody@b.com", "secret").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn token_for_a_removed_identity_is_rejected() {
        let (authority, directory) = authority();
        let identity = directory.add_user("a@b.com", "secret");
        let (_, token) = authority.login("a@b.com", "secret").await.unwrap();

        directory.remove(identity.id);

        let result = authority.validate(&token).await;
        assert!(matches!(result, Err(AuthError::UnknownIdentity(_))));
    }
}

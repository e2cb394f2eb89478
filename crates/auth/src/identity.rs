//! Identities and the directory they are looked up in.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::IdentityId;
use serde::{Deserialize, Serialize};

/// An authenticated caller, as resolved by the credential authority.
///
/// Immutable once issued; owned by the caller for the duration of one
/// request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
}

/// A directory entry pairing an identity with its stored password hash.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub identity: Identity,
    pub password_hash: String,
}

/// Trait for identity lookup.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Looks up an identity by id.
    async fn find(&self, id: IdentityId) -> Option<IdentityRecord>;

    /// Looks up an identity by email.
    async fn find_by_email(&self, email: &str) -> Option<IdentityRecord>;
}

/// Checks a supplied password against a stored hash.
///
/// Hashing itself is an external collaborator; deployments substitute a
/// real hashing implementation at this seam.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, candidate: &str, stored: &str) -> bool;
}

/// Stand-in verifier comparing raw strings.
#[derive(Debug, Clone, Default)]
pub struct PlaintextVerifier;

impl PasswordVerifier for PlaintextVerifier {
    fn verify(&self, candidate: &str, stored: &str) -> bool {
        candidate == stored
    }
}

/// In-memory identity directory for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<Vec<IdentityRecord>>>,
}

impl InMemoryDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns the identity created for it.
    pub fn add_user(&self, email: impl Into<String>, password_hash: impl Into<String>) -> Identity {
        let identity = Identity {
            id: IdentityId::new(),
            email: email.into(),
        };
        self.state.write().unwrap().push(IdentityRecord {
            identity: identity.clone(),
            password_hash: password_hash.into(),
        });
        identity
    }

    /// Removes a user, invalidating tokens that reference it.
    pub fn remove(&self, id: IdentityId) {
        self.state
            .write()
            .unwrap()
            .retain(|record| record.identity.id != id);
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryDirectory {
    async fn find(&self, id: IdentityId) -> Option<IdentityRecord> {
        self.state
            .read()
            .unwrap()
            .iter()
            .find(|record| record.identity.id == id)
            .cloned()
    }

    async fn find_by_email(&self, email: &str) -> Option<IdentityRecord> {
        self.state
            .read()
            .unwrap()
            .iter()
            .find(|record| record.identity.email == email)
            .cloned()
    }
}

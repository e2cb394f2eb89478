//! Bearer token encoding and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use crate::identity::Identity;

/// Claims carried inside a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id the token was issued for.
    pub sub: Uuid,
    pub email: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and verifies bearer tokens (HS256, shared secret).
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec with the given shared secret and token lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issues a signed token for an identity, expiring after the
    /// configured lifetime.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        let claims = Claims {
            sub: identity.id.as_uuid(),
            email: identity.email.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verifies a token and returns its claims.
    ///
    /// Structural damage, a signature mismatch, and expiry all surface as
    /// errors here.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

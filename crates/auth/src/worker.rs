//! Serves token validation requests over the broker.

use serde_json::Value;

use messaging::RequestStream;

use crate::authority::CredentialAuthority;
use crate::guard::AUTH_TOKEN_FIELD;
use crate::identity::{IdentityDirectory, PasswordVerifier};
use crate::{AuthError, Result};

/// Answers the validation request/reply channel for a credential
/// authority.
///
/// One request in, one reply out: the serialized identity on success, an
/// undifferentiated rejection otherwise. The detailed failure reason only
/// goes to the authority's own log.
pub struct ValidationWorker<D, V> {
    authority: CredentialAuthority<D, V>,
}

impl<D, V> ValidationWorker<D, V>
where
    D: IdentityDirectory,
    V: PasswordVerifier,
{
    /// Creates a worker answering for the given authority.
    pub fn new(authority: CredentialAuthority<D, V>) -> Self {
        Self { authority }
    }

    /// Serves requests until the bus shuts down.
    pub async fn run(self, mut requests: RequestStream) {
        while let Some(request) = requests.recv().await {
            let correlation_id = request.correlation_id;
            match self.handle(&request.payload).await {
                Ok(reply) => {
                    metrics::counter!("auth_validations_total").increment(1);
                    tracing::debug!(%correlation_id, "token validated");
                    request.respond(Ok(reply));
                }
                Err(e) => {
                    metrics::counter!("auth_validation_failures_total").increment(1);
                    tracing::debug!(%correlation_id, error = %e, "token validation failed");
                    request.respond(Err(AuthError::Unauthenticated.to_string()));
                }
            }
        }
        tracing::info!("validation worker stopped");
    }

    async fn handle(&self, payload: &Value) -> Result<Value> {
        let token = payload
            .get(AUTH_TOKEN_FIELD)
            .and_then(Value::as_str)
            .ok_or(AuthError::Unauthenticated)?;

        let identity = self.authority.validate(token).await?;
        serde_json::to_value(&identity).map_err(|_| AuthError::Unauthenticated)
    }
}

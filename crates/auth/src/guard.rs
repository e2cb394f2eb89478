//! The authentication delegation guard.
//!
//! Protected services never validate credentials locally. The guard turns
//! an inbound call into one validation request to the credential
//! authority, waits for the reply under a bound, and attaches the
//! resolved identity to the call. The same guard serves HTTP and
//! message-pattern calls; only the [`CallContext`] adapter differs.

use std::time::Duration;

use serde_json::Value;

use messaging::MessageBus;

use crate::identity::Identity;
use crate::{AuthError, Result};

/// Field the bearer token travels in: cookie name on HTTP, payload field
/// on broker messages.
pub const AUTH_TOKEN_FIELD: &str = "Authentication";

/// Capability seam between the guard and a concrete call kind.
pub trait CallContext {
    /// Reads the bearer token from the call, if the caller sent one.
    fn bearer_token(&self) -> Option<String>;

    /// Attaches the resolved identity where downstream handlers read it.
    fn attach_identity(&mut self, identity: Identity);
}

/// Delegates credential validation to the credential authority over the
/// broker's request/reply channel.
pub struct AuthGuard<B> {
    bus: B,
    pattern: String,
    timeout: Duration,
}

impl<B: MessageBus> AuthGuard<B> {
    /// Creates a guard that validates against the given pattern with a
    /// bounded wait.
    pub fn new(bus: B, pattern: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bus,
            pattern: pattern.into(),
            timeout,
        }
    }

    /// Authorizes one inbound call.
    ///
    /// A missing token fails immediately without a remote call. Error
    /// replies, channel errors, and authority silence past the timeout
    /// all collapse into the same rejection; the caller's task always
    /// resolves.
    #[tracing::instrument(skip(self, ctx), fields(pattern = %self.pattern))]
    pub async fn authorize<C: CallContext>(&self, ctx: &mut C) -> Result<Identity> {
        let Some(token) = ctx.bearer_token() else {
            metrics::counter!("auth_guard_rejections_total").increment(1);
            return Err(AuthError::Unauthenticated);
        };

        let payload = serde_json::json!({ (AUTH_TOKEN_FIELD): token });
        let outcome = tokio::time::timeout(self.timeout, self.bus.request(&self.pattern, payload));

        let identity = match outcome.await {
            Ok(Ok(reply)) => serde_json::from_value::<Identity>(reply).map_err(|e| {
                tracing::error!(error = %e, "malformed validation reply");
                AuthError::Unauthenticated
            })?,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "credential authority rejected the token");
                metrics::counter!("auth_guard_rejections_total").increment(1);
                return Err(AuthError::Unauthenticated);
            }
            Err(_) => {
                tracing::warn!("credential authority timed out");
                metrics::counter!("auth_guard_rejections_total").increment(1);
                return Err(AuthError::Unauthenticated);
            }
        };

        ctx.attach_identity(identity.clone());
        Ok(identity)
    }
}

/// Call context over an inbound broker message.
///
/// The token rides in the [`AUTH_TOKEN_FIELD`] field of the payload; the
/// resolved identity is held on the context for the handler.
pub struct MessageCall {
    payload: Value,
    identity: Option<Identity>,
}

impl MessageCall {
    /// Wraps an inbound message payload.
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            identity: None,
        }
    }

    /// The message payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The identity attached by the guard, once authorized.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

impl CallContext for MessageCall {
    fn bearer_token(&self) -> Option<String> {
        self.payload
            .get(AUTH_TOKEN_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn attach_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}

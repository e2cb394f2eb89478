//! Authentication middleware over the delegation guard.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Extensions;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use auth::{AUTH_TOKEN_FIELD, CallContext, Identity};
use messaging::MessageBus;
use orders::Order;
use store::DocumentStore;

use crate::error::ApiError;
use crate::routes::orders::AppState;

/// Call context over an inbound HTTP request.
///
/// The token rides in the `Authentication` cookie; the resolved identity
/// lands in the request extensions for [`axum::Extension`] extraction.
struct HttpCall<'a> {
    token: Option<String>,
    extensions: &'a mut Extensions,
}

impl CallContext for HttpCall<'_> {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn attach_identity(&mut self, identity: Identity) {
        self.extensions.insert(identity);
    }
}

/// Rejects the request unless the delegation guard resolves an identity.
pub async fn require_auth<S, B>(
    State(state): State<Arc<AppState<S, B>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: DocumentStore<Order> + 'static,
    B: MessageBus + 'static,
{
    let token = jar
        .get(AUTH_TOKEN_FIELD)
        .map(|cookie| cookie.value().to_string());

    let mut call = HttpCall {
        token,
        extensions: request.extensions_mut(),
    };
    state.guard.authorize(&mut call).await?;

    Ok(next.run(request).await)
}

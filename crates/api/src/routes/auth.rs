//! Login endpoint issuing the authentication cookie.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::{Deserialize, Serialize};

use auth::AUTH_TOKEN_FIELD;
use messaging::MessageBus;
use orders::Order;
use store::DocumentStore;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub email: String,
}

/// POST /auth/login — verify credentials and set the bearer-token cookie.
#[tracing::instrument(skip(state, jar, request))]
pub async fn login<S, B>(
    State(state): State<Arc<AppState<S, B>>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError>
where
    S: DocumentStore<Order> + 'static,
    B: MessageBus + 'static,
{
    let (identity, token) = state
        .authority
        .login(&request.email, &request.password)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "login failed");
            ApiError::Unauthenticated
        })?;

    let cookie = Cookie::build((AUTH_TOKEN_FIELD, token))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            id: identity.id.to_string(),
            email: identity.email,
        }),
    ))
}

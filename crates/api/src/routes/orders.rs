//! Order endpoints, protected by the delegation guard.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use auth::{AuthGuard, CredentialAuthority, Identity, InMemoryDirectory, PlaintextVerifier};
use common::CreateOrderRequest;
use messaging::MessageBus;
use orders::{Order, OrderService};
use store::DocumentStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, B> {
    pub orders: OrderService<S, B>,
    pub guard: AuthGuard<B>,
    pub authority: CredentialAuthority<InMemoryDirectory, PlaintextVerifier>,
}

/// POST /orders — create an order and notify billing.
#[tracing::instrument(skip(state, request))]
pub async fn create<S, B>(
    State(state): State<Arc<AppState<S, B>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    S: DocumentStore<Order> + 'static,
    B: MessageBus + 'static,
{
    if request.price <= 0 {
        return Err(ApiError::BadRequest("price must be positive".to_string()));
    }

    tracing::info!(user = %identity.email, order_name = %request.name, "creating order");
    let order = state.orders.create_order(request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — list all orders.
#[tracing::instrument(skip(state))]
pub async fn list<S, B>(
    State(state): State<Arc<AppState<S, B>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: DocumentStore<Order> + 'static,
    B: MessageBus + 'static,
{
    tracing::debug!(user = %identity.email, "listing orders");
    let orders = state.orders.get_orders().await?;
    Ok(Json(orders))
}

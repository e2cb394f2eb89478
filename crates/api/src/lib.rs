//! HTTP API server and process wiring for the order services.
//!
//! Provides the guarded order endpoints and the login endpoint, with
//! structured logging (tracing) and Prometheus metrics. The in-process
//! wiring runs the credential authority's validation worker and the
//! billing consumer next to the HTTP surface, talking over the same bus
//! a deployment would reach through a real broker.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::{
    AuthGuard, CredentialAuthority, InMemoryDirectory, PlaintextVerifier, TokenCodec,
    ValidationWorker,
};
use billing::{BillingConsumer, InMemoryBillingProcessor};
use messaging::{InMemoryBus, MessageBus};
use orders::{Order, OrderService};
use store::{DocumentStore, InMemoryStore};

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, B>(state: Arc<AppState<S, B>>, metrics_handle: PrometheusHandle) -> Router
where
    S: DocumentStore<Order> + 'static,
    B: MessageBus + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let guarded = Router::new()
        .route(
            "/orders",
            post(routes::orders::create::<S, B>).get(routes::orders::list::<S, B>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth::<S, B>,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/login", post(routes::auth::login::<S, B>))
        .with_state(state)
        .merge(guarded)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over in-memory collaborators.
///
/// Spawns the credential authority's validation worker and the billing
/// consumer as in-process tasks on the same bus; identities come from the
/// caller-seeded directory.
pub async fn create_default_state(
    config: &Config,
    directory: InMemoryDirectory,
) -> (
    Arc<AppState<InMemoryStore<Order>, InMemoryBus>>,
    InMemoryBus,
    InMemoryStore<Order>,
    InMemoryBillingProcessor,
) {
    let bus = InMemoryBus::new();
    let store = InMemoryStore::new();

    let codec = TokenCodec::new(
        &config.jwt_secret,
        chrono::Duration::seconds(config.token_ttl_secs),
    );

    // Credential authority service.
    let requests = bus
        .serve(&config.auth_pattern)
        .await
        .expect("failed to register the validation responder");
    let worker_authority =
        CredentialAuthority::new(codec.clone(), directory.clone(), PlaintextVerifier);
    tokio::spawn(ValidationWorker::new(worker_authority).run(requests));

    // Billing consumer service.
    let deliveries = bus
        .subscribe(&config.billing_pattern)
        .await
        .expect("failed to subscribe to the billing queue");
    let billing_processor = InMemoryBillingProcessor::new();
    tokio::spawn(BillingConsumer::new(billing_processor.clone()).run(deliveries));

    let guard = AuthGuard::new(
        bus.clone(),
        config.auth_pattern.clone(),
        Duration::from_millis(config.auth_timeout_ms),
    );
    let orders = OrderService::new(store.clone(), bus.clone(), config.billing_pattern.clone());
    let authority = CredentialAuthority::new(codec, directory, PlaintextVerifier);

    let state = Arc::new(AppState {
        orders,
        guard,
        authority,
    });

    (state, bus, store, billing_processor)
}

pub mod orders;

use crate::config::ServerConfig;
use crate::middleware::logging::{make_request_span, UuidRequestId};
use crate::orders::OrderStore;
use crate::services::DepositFlow;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: OrderStore,
    pub flow: Arc<DepositFlow>,
}

impl AppState {
    pub fn new(flow: DepositFlow) -> Self {
        Self {
            store: flow.store().clone(),
            flow: Arc::new(flow),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(orders::ping))
        .route("/order", get(orders::list_orders).post(orders::create_order))
        .route("/order/{id}", get(orders::get_order))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

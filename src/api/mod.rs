pub mod auth;
pub mod error;
pub mod routes;

use crate::api::auth::TokenRegistry;
use crate::api::error::ApiError;
use crate::controller::MatterController;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<MatterController>,
    pub tokens: TokenRegistry,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/api/token", post(routes::create_token))
        .route("/api/devices", get(routes::list_devices))
        .route("/api/devices/{node_id}/toggle", post(routes::toggle_device))
        .route("/api/hub", get(routes::hub_info))
        .route("/api/analytics", post(routes::query_analytics))
        .route("/api/logs", post(routes::query_logs))
        .route("/api/bind", post(routes::create_binding))
        .route("/pair", post(routes::pair))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

/// Everything under `/api` except token issuance requires a bearer token.
/// The root and `/pair` stay open, matching the clients in the field.
async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let path = request.uri().path();
    if !path.starts_with("/api") || path == "/api/token" {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if state.tokens.is_valid(token).await => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}

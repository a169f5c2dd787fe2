use crate::api::AppState;
use crate::api::auth::{TokenRequest, TokenResponse};
use crate::api::error::ApiError;
use crate::domain::{AnalyticsQuery, AnalyticsReport, Device, HubInfo, LogPage, LogQuery, PairRequest};
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

pub async fn create_token(State(state): State<AppState>, Json(request): Json<TokenRequest>) -> Json<TokenResponse> {
    Json(state.tokens.issue(&request).await)
}

pub async fn list_devices(State(state): State<AppState>) -> Json<Vec<Device>> {
    Json(state.controller.get_devices().await)
}

pub async fn hub_info(State(state): State<AppState>) -> Json<HubInfo> {
    Json(state.controller.get_hub_info().await)
}

pub async fn query_analytics(
    State(state): State<AppState>,
    Json(query): Json<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    Ok(Json(state.controller.get_analytics(&query).await?))
}

pub async fn query_logs(State(state): State<AppState>, Json(query): Json<LogQuery>) -> Result<Json<LogPage>, ApiError> {
    Ok(Json(state.controller.get_logs(&query).await?))
}

pub async fn pair(State(state): State<AppState>, Json(request): Json<PairRequest>) -> Result<Json<Value>, ApiError> {
    let device = state.controller.pair(request).await?;
    Ok(Json(json!({
        "message": format!("Successfully paired '{}' as node {}", device.name, device.id),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default = "default_endpoint")]
    pub endpoint: u16,
}

pub async fn toggle_device(
    State(state): State<AppState>,
    Path(node_id): Path<u64>,
    payload: Option<Json<ToggleRequest>>,
) -> Result<Json<Value>, ApiError> {
    let endpoint = payload.map(|Json(request)| request.endpoint).unwrap_or_else(default_endpoint);
    state.controller.toggle(node_id, endpoint).await?;
    Ok(Json(json!({
        "message": format!("Toggled node {node_id} on endpoint {endpoint}"),
    })))
}

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub switch_node: u64,
    pub light_node: u64,
    #[serde(default = "default_endpoint")]
    pub endpoint: u16,
    #[serde(default = "default_cluster")]
    pub cluster: u32,
}

pub async fn create_binding(State(state): State<AppState>, Json(request): Json<BindRequest>) -> Result<Json<Value>, ApiError> {
    state
        .controller
        .bind(request.switch_node, request.light_node, request.endpoint, request.cluster)
        .await?;
    Ok(Json(json!({
        "message": format!("Bound node {} to node {}", request.switch_node, request.light_node),
    })))
}

// Defaults match what chip-tool assumes: endpoint 1, the OnOff cluster.
fn default_endpoint() -> u16 {
    1
}

fn default_cluster() -> u32 {
    6
}

use crate::chip::BridgeError;
use crate::controller::ControllerError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Every API failure renders as a non-200 status with a `{"detail": ...}`
/// body, the error shape clients already consume.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Controller(error) => match error {
                ControllerError::InvalidCode(_) => StatusCode::BAD_REQUEST,
                ControllerError::AlreadyPaired { .. } => StatusCode::CONFLICT,
                ControllerError::UnknownDevice { .. } => StatusCode::NOT_FOUND,
                ControllerError::Bridge(BridgeError::Unreachable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                ControllerError::Bridge(BridgeError::Command(_)) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use paydash_sdk::DashboardError;
use serde_json::json;

/// Renders as a JSON `{"error": "..."}` response with a matching status.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<DashboardError> for AppError {
    fn from(e: DashboardError) -> Self {
        match &e {
            DashboardError::NotFound(msg) => AppError::not_found(msg.clone()),
            DashboardError::Fetch(_) | DashboardError::Timeout(_) => {
                AppError::bad_gateway(e.to_string())
            }
            _ => AppError::internal(e.to_string()),
        }
    }
}

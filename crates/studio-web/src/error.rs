use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use studio_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidPath(path) => {
                tracing::debug!("Rejected request path: {path}");
                AppError::NotFound("Not found".to_string())
            }
            CoreError::NotFound(path) => AppError::NotFound(format!("No static resource {path}")),
            other => AppError::Unavailable(other.to_string()),
        }
    }
}

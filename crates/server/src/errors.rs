use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/// A custom error type for the server application.
///
/// Every variant renders as `{"error": ..., "status": "error"}`.
#[derive(Debug)]
pub enum AppError {
    /// The request did not declare a JSON body.
    UnsupportedMediaType,
    /// The body was not a usable question.
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::UnsupportedMediaType => {
                warn!("Request missing JSON content type");
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Content-Type must be application/json".to_string(),
                )
            }
            AppError::BadRequest(message) => {
                warn!("Rejected request: {message}");
                (StatusCode::BAD_REQUEST, message)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": "error",
        }));

        (status_code, body).into_response()
    }
}

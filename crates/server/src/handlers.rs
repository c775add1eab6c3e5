use super::{errors::AppError, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use finbot::constants::DEFAULT_SESSION_ID;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// --- API Payloads ---

#[derive(Deserialize, Debug)]
pub struct AskRequest {
    pub query: String,
    /// Conversation to continue. Requests without one share the default session.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AskResponse {
    pub response: String,
    pub status: String,
}

// --- Handlers ---

/// The root handler.
pub async fn root() -> &'static str {
    "Finance Bot server is running."
}

/// Reports `OK` only while the database answers a trivial query.
pub async fn health_check(State(app_state): State<AppState>) -> (StatusCode, &'static str) {
    if app_state.bot.test_connection().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}

/// The handler for the `/ask` endpoint.
///
/// Any body that is not a JSON object with a string `query` is a 400. The bot
/// itself never fails, so a valid question always gets a 200.
pub async fn ask_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType,
        other => {
            debug!("Unusable /ask body: {other}");
            AppError::BadRequest("Missing query parameter".to_string())
        }
    })?;

    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("Query cannot be empty".to_string()));
    }

    let session_id = request
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID);
    info!(session_id, "Processing query: {query}");

    let response = app_state.bot.ask_in_session(session_id, query).await;
    info!(
        "Generated response: {}",
        response.chars().take(200).collect::<String>()
    );

    Ok(Json(AskResponse {
        response,
        status: "success".to_string(),
    }))
}

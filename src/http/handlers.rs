// HTTP handlers for the moderation endpoints.
//
// Status taxonomy:
// - 400: structurally rejected input (missing or empty fields)
// - 200: computed decision, which may itself reject the content
// - 500: moderation subsystem degraded; the payload is the fail-open
//   default, so content passes

use crate::core::moderation::{MediaType, ModerationError, ModerationResult};
use crate::http::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

const DEFAULT_RECENT_LIMIT: u32 = 20;
// Hard cap on the recent-log page size.
const MAX_RECENT_LIMIT: u32 = 100;

/// Inbound body for POST /moderate. Both fields parse as optional so a
/// missing one maps to a 400 rather than a body-parse failure.
#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    content: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<MediaType>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
}

/// Fail-open payload: an approving result plus the error indicator.
#[derive(Debug, Serialize)]
pub struct FailOpenBody {
    #[serde(flatten)]
    result: ModerationResult,
    error: String,
}

/// POST /moderate - run the decision pipeline over submitted content.
pub async fn moderate(
    State(state): State<AppState>,
    body: Result<Json<ModerateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            // Unparseable body lands on the documented fail-open branch.
            tracing::error!("Failed to parse moderation request body: {rejection}");
            return fail_open_response(rejection.to_string());
        }
    };

    let (Some(content), Some(media_type)) = (request.content, request.media_type) else {
        return bad_request("content and type are required");
    };

    match state.moderation.decide(&content, media_type).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(ModerationError::InvalidInput(message)) => bad_request(&message),
        Err(err) => {
            tracing::error!("Moderation pipeline failed: {err}");
            fail_open_response(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    limit: Option<u32>,
}

/// GET /moderate/recent - most recent decision log entries.
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    match state.moderation.recent_decisions(limit).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => {
            tracing::error!("Failed to load recent moderation decisions: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health - liveness probe; the integration runner polls this.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn fail_open_response(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailOpenBody {
            result: ModerationResult::fail_open(),
            error,
        }),
    )
        .into_response()
}

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analytics::PageView;
use crate::error::ApiError;
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackRequest {
    #[serde(default)]
    path: String,
    referrer: Option<String>,
    session_id: Option<String>,
    user_agent: Option<String>,
}

/// POST /api/analytics/track - record a page view
pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Value> {
    let request: TrackRequest = parse_body(payload)?;
    if !request.path.starts_with('/') {
        return Err(ApiError::bad_request("path must start with '/'"));
    }

    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let user_agent = request.user_agent.or_else(|| {
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    state
        .analytics
        .append(PageView {
            path: request.path,
            referrer: request.referrer,
            session_id: session_id.clone(),
            user_agent,
            timestamp: chrono::Utc::now(),
        })
        .await;

    Ok(ApiResponse::with_status(json!({ "sessionId": session_id }), StatusCode::ACCEPTED))
}

use axum::{
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::FamilySession;
use crate::handlers::utils::{delete_by_id, insert_new, parse_body, replace_by_id};
use crate::middleware::{authorize_member, ApiJson, ApiResponse, ApiResult, ProviderToken};
use crate::models::calendar::events_path;
use crate::models::CalendarEvent;
use crate::state::AppState;

const NOT_FOUND: &str = "Event not found";

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Inclusive `YYYY-MM-DD` bounds
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/family/:member/calendar[?from=&to=]
pub async fn list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Vec<CalendarEvent>> {
    authorize_member(&session, &member)?;

    let events: Vec<CalendarEvent> = state.repo.load(token.as_str(), &events_path(&member)).await;
    let events: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|e| e.overlaps(range.from.as_deref(), range.to.as_deref()))
        .collect();

    Ok(ApiResponse::success(events))
}

/// POST /api/family/:member/calendar
pub async fn create(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<CalendarEvent> {
    authorize_member(&session, &member)?;

    let mut event: CalendarEvent = parse_body(payload)?;
    event.validate()?;
    event.normalize();

    let created = state
        .repo
        .update(token.as_str(), &events_path(&member), |events: &mut Vec<CalendarEvent>| {
            Ok(insert_new(events, event.clone()))
        })
        .await?;

    tracing::info!("{} added event '{}' for {}", session.username, created.title, member);
    Ok(ApiResponse::created(created))
}

/// PUT /api/family/:member/calendar/:id - full replace
pub async fn update(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<CalendarEvent> {
    authorize_member(&session, &member)?;

    let mut event: CalendarEvent = parse_body(payload)?;
    event.validate()?;
    event.normalize();

    let updated = state
        .repo
        .update(token.as_str(), &events_path(&member), |events: &mut Vec<CalendarEvent>| {
            replace_by_id(events, &id, event.clone(), NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/family/:member/calendar/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, id)): Path<(String, String)>,
) -> ApiResult<CalendarEvent> {
    authorize_member(&session, &member)?;

    let removed = state
        .repo
        .update(token.as_str(), &events_path(&member), |events: &mut Vec<CalendarEvent>| {
            delete_by_id(events, &id, NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(removed))
}

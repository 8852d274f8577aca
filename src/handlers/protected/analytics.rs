use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::analytics::{AnalyticsQuery, AnalyticsSummary};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// RFC 3339 lower bound, e.g. 2025-01-01T00:00:00Z
    pub since: Option<String>,
    pub top: Option<usize>,
}

/// GET /api/analytics - aggregated page views
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<AnalyticsSummary> {
    let since = match query.since.as_deref() {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| ApiError::bad_request("since must be an RFC 3339 timestamp"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let summary = state
        .analytics
        .query(AnalyticsQuery {
            since,
            top: query.top.unwrap_or(10),
        })
        .await;

    Ok(ApiResponse::success(summary))
}

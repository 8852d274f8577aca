use axum::{
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::FamilySession;
use crate::error::ApiError;
use crate::handlers::utils::{delete_by_id, insert_new, parse_body, replace_by_id};
use crate::middleware::{authorize_member, ApiJson, ApiResponse, ApiResult, ProviderToken};
use crate::models::finance::transactions_path;
use crate::models::{FinanceSummary, Transaction};
use crate::state::AppState;

const NOT_FOUND: &str = "Transaction not found";

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
}

/// GET /api/family/:member/finances
pub async fn list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
) -> ApiResult<Vec<Transaction>> {
    authorize_member(&session, &member)?;

    let transactions: Vec<Transaction> = state.repo.load(token.as_str(), &transactions_path(&member)).await;
    Ok(ApiResponse::success(transactions))
}

/// GET /api/family/:member/finances/summary[?month=YYYY-MM]
pub async fn summary(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<FinanceSummary> {
    authorize_member(&session, &member)?;

    if let Some(month) = query.month.as_deref() {
        let valid = month.len() == 7
            && month.as_bytes()[4] == b'-'
            && month.chars().enumerate().all(|(i, c)| i == 4 || c.is_ascii_digit());
        if !valid {
            return Err(ApiError::bad_request("month must be YYYY-MM"));
        }
    }

    let transactions: Vec<Transaction> = state.repo.load(token.as_str(), &transactions_path(&member)).await;
    Ok(ApiResponse::success(FinanceSummary::from_transactions(
        &transactions,
        query.month.as_deref(),
    )))
}

/// `amount` must be present; zero is a valid amount
fn parse_transaction(payload: Value) -> Result<Transaction, ApiError> {
    if payload.get("amount").map_or(true, Value::is_null) {
        return Err(ApiError::required_field("amount"));
    }
    let transaction: Transaction = parse_body(payload)?;
    transaction.validate()?;
    Ok(transaction)
}

/// POST /api/family/:member/finances
pub async fn create(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Transaction> {
    authorize_member(&session, &member)?;

    let transaction = parse_transaction(payload)?;

    let created = state
        .repo
        .update(token.as_str(), &transactions_path(&member), |transactions: &mut Vec<Transaction>| {
            Ok(insert_new(transactions, transaction.clone()))
        })
        .await?;

    tracing::info!("{} recorded {:?} of {} for {}", session.username, created.kind, created.amount, member);
    Ok(ApiResponse::created(created))
}

/// PUT /api/family/:member/finances/:id - full replace
pub async fn update(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Transaction> {
    authorize_member(&session, &member)?;

    let transaction = parse_transaction(payload)?;

    let updated = state
        .repo
        .update(token.as_str(), &transactions_path(&member), |transactions: &mut Vec<Transaction>| {
            replace_by_id(transactions, &id, transaction.clone(), NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/family/:member/finances/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, id)): Path<(String, String)>,
) -> ApiResult<Transaction> {
    authorize_member(&session, &member)?;

    let removed = state
        .repo
        .update(token.as_str(), &transactions_path(&member), |transactions: &mut Vec<Transaction>| {
            delete_by_id(transactions, &id, NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(removed))
}

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_session, FamilySession};
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the signed family session
pub const FAMILY_TOKEN_HEADER: &str = "x-family-token";

/// Storage provider credential, passed through verbatim to the document store
#[derive(Clone, Debug)]
pub struct ProviderToken(pub String);

impl ProviderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolve the provider token from `Authorization: Bearer` or the provider cookie
pub fn resolve_provider_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_from_headers(headers).or_else(|| cookie_from_headers(headers, cookie_name))
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn cookie_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Rejects requests without a provider token before any store call is made
pub async fn provider_token_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = resolve_provider_token(request.headers(), &state.config.security.provider_cookie)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    request.extensions_mut().insert(ProviderToken(token));
    Ok(next.run(request).await)
}

/// Validates X-Family-Token and injects the verified `FamilySession`
pub async fn family_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(FAMILY_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Family token required"))?;

    let session = verify_session(token, &state.config.security.session_secret)?;
    tracing::debug!("Family session for {} ({:?})", session.username, session.role);

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Validate `member` as a path segment and check the session may act for it
pub fn authorize_member(session: &FamilySession, member: &str) -> Result<(), ApiError> {
    crate::storage::validate_segment(member)?;
    if !session.can_access(member) {
        tracing::warn!("{} tried to access data of {}", session.username, member);
        return Err(ApiError::forbidden("Access to this family member is not allowed"));
    }
    Ok(())
}

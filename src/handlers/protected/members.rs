// handlers/protected/members.rs - Family roster, settings and member login
//
// All of these live in family/family.json ({ members, settings }).

use axum::{
    extract::{Extension, Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{hash_password, issue_session, verify_password, Claims, PasswordCheck};
use crate::collection::{find_by_id_mut, next_id};
use crate::error::ApiError;
use crate::handlers::utils::{delete_by_id, parse_body};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProviderToken};
use crate::models::family::FAMILY_PATH;
use crate::models::{now_rfc3339, FamilyDocument, FamilyMember, FamilySettings, MemberInput, MemberView};
use crate::state::AppState;

const NOT_FOUND: &str = "Family member not found";

/// GET /api/family/members
pub async fn list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
) -> ApiResult<Vec<MemberView>> {
    let doc: FamilyDocument = state.repo.load(token.as_str(), FAMILY_PATH).await;
    Ok(ApiResponse::success(doc.members.iter().map(MemberView::from).collect()))
}

/// POST /api/family/members
pub async fn create(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<MemberView> {
    let input: MemberInput = parse_body(payload)?;
    let member = add_member(&state, token.as_str(), input).await?;
    Ok(ApiResponse::created(MemberView::from(&member)))
}

/// Validate, hash and append a new member. Shared with `hubctl members add`.
pub async fn add_member(state: &AppState, token: &str, input: MemberInput) -> Result<FamilyMember, ApiError> {
    input.validate(true)?;
    let password_hash = hash_password(input.password.as_deref().unwrap_or_default())?;

    let member = state
        .repo
        .update(token, FAMILY_PATH, |doc: &mut FamilyDocument| {
            if doc.username_taken(&input.username, None) {
                return Err(ApiError::conflict(format!("Username '{}' is already taken", input.username)));
            }

            let member = FamilyMember {
                id: next_id(),
                username: input.username.clone(),
                display_name: input.display_name.clone(),
                role: input.role,
                password_hash: password_hash.clone(),
                created_at: Some(now_rfc3339()),
                extra: input.extra.clone(),
            };
            doc.members.push(member.clone());
            Ok(member)
        })
        .await?;

    tracing::info!("Added family member {} as {:?}", member.username, member.role);
    Ok(member)
}

/// PUT /api/family/members/:id - replaces profile fields; password only when supplied, username fixed
pub async fn update(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<MemberView> {
    let input: MemberInput = parse_body(payload)?;
    input.validate(false)?;
    let password_hash = match input.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let member = state
        .repo
        .update(token.as_str(), FAMILY_PATH, |doc: &mut FamilyDocument| {
            if doc.username_taken(&input.username, Some(&id)) {
                return Err(ApiError::conflict(format!("Username '{}' is already taken", input.username)));
            }

            let member = find_by_id_mut(&mut doc.members, &id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
            // Member data lives under family/{username}/ and sessions carry the username
            if member.username != input.username {
                return Err(ApiError::bad_request("username cannot be changed"));
            }
            member.display_name = input.display_name.clone();
            member.role = input.role;
            member.extra = input.extra.clone();
            if let Some(hash) = &password_hash {
                member.password_hash = hash.clone();
            }
            Ok(member.clone())
        })
        .await?;

    Ok(ApiResponse::success(MemberView::from(&member)))
}

/// DELETE /api/family/members/:id
///
/// The member's own documents under family/{username}/ are left in place.
pub async fn delete(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Path(id): Path<String>,
) -> ApiResult<MemberView> {
    let removed = state
        .repo
        .update(token.as_str(), FAMILY_PATH, |doc: &mut FamilyDocument| {
            delete_by_id(&mut doc.members, &id, NOT_FOUND)
        })
        .await?;

    tracing::info!("Removed family member {}", removed.username);
    Ok(ApiResponse::success(MemberView::from(&removed)))
}

/// GET /api/family/settings
pub async fn settings_get(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
) -> ApiResult<FamilySettings> {
    let doc: FamilyDocument = state.repo.load(token.as_str(), FAMILY_PATH).await;
    Ok(ApiResponse::success(doc.settings))
}

/// PUT /api/family/settings - full replace
pub async fn settings_put(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<FamilySettings> {
    let settings: FamilySettings = parse_body(payload)?;

    let saved = state
        .repo
        .update(token.as_str(), FAMILY_PATH, |doc: &mut FamilyDocument| {
            doc.settings = settings.clone();
            Ok(doc.settings.clone())
        })
        .await?;

    Ok(ApiResponse::success(saved))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub member: MemberView,
    pub expires_in: u64,
}

/// POST /api/family/login - exchange member credentials for an X-Family-Token
pub async fn login(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<LoginResponse> {
    let request: LoginRequest = parse_body(payload)?;
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    // Strict read: a storage outage must not look like "no such user"
    let doc: FamilyDocument = state.repo.load_strict(token.as_str(), FAMILY_PATH).await?;
    let member = doc
        .find_by_username(&request.username)
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("Login failed: unknown member '{}'", request.username);
            ApiError::unauthorized("Invalid username or password")
        })?;

    match verify_password(&request.password, &member.password_hash) {
        PasswordCheck::Valid => {}
        PasswordCheck::ValidLegacy => upgrade_legacy_hash(&state, token.as_str(), &member, &request.password).await,
        PasswordCheck::Invalid => {
            tracing::warn!("Login failed: bad password for '{}'", member.username);
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    }

    let expiry_hours = state.config.security.session_expiry_hours;
    let claims = Claims::for_member(&member, expiry_hours);
    let session = issue_session(&claims, &state.config.security.session_secret)?;

    tracing::info!("Family member {} logged in", member.username);
    Ok(ApiResponse::success(LoginResponse {
        token: session,
        member: MemberView::from(&member),
        expires_in: expiry_hours * 3600,
    }))
}

/// Replace an unsalted SHA-256 hash with Argon2id. Failure only costs a retry on next login.
async fn upgrade_legacy_hash(state: &AppState, token: &str, member: &FamilyMember, password: &str) {
    let new_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Could not re-hash legacy password for {}: {}", member.username, e);
            return;
        }
    };

    let result = state
        .repo
        .update(token, FAMILY_PATH, |doc: &mut FamilyDocument| {
            if let Some(stored) = find_by_id_mut(&mut doc.members, &member.id) {
                // Skip if the password changed since we read it
                if stored.password_hash == member.password_hash {
                    stored.password_hash = new_hash.clone();
                }
            }
            Ok(())
        })
        .await;

    match result {
        Ok(()) => tracing::info!("Upgraded legacy password hash for {}", member.username),
        Err(e) => tracing::warn!("Legacy hash upgrade for {} failed: {}", member.username, e),
    }
}

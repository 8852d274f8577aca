use axum::{
    extract::{Extension, Path, State},
};
use serde_json::Value;

use crate::collection::find_by_id;
use crate::error::ApiError;
use crate::handlers::utils::{delete_by_id, insert_new, parse_body, replace_by_id};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, ProviderToken};
use crate::models::project::PROJECTS_PATH;
use crate::models::{now_rfc3339, Project, ProjectsDocument};
use crate::state::AppState;

const NOT_FOUND: &str = "Project not found";

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
) -> ApiResult<Vec<Project>> {
    let doc: ProjectsDocument = state.repo.load(token.as_str(), PROJECTS_PATH).await;
    Ok(ApiResponse::success(doc.projects))
}

/// GET /api/projects/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let doc: ProjectsDocument = state.repo.load(token.as_str(), PROJECTS_PATH).await;
    find_by_id(&doc.projects, &id)
        .cloned()
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Project> {
    let mut project: Project = parse_body(payload)?;
    project.validate()?;
    project.normalize();

    let created = state
        .repo
        .update(token.as_str(), PROJECTS_PATH, |doc: &mut ProjectsDocument| {
            let created = insert_new(&mut doc.projects, project.clone());
            doc.last_updated = Some(now_rfc3339());
            Ok(created)
        })
        .await?;

    tracing::info!("Created project {} ({})", created.name, created.id);
    Ok(ApiResponse::created(created))
}

/// PUT /api/projects/:id - full replace
pub async fn update(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Project> {
    let mut project: Project = parse_body(payload)?;
    project.validate()?;
    project.normalize();

    let updated = state
        .repo
        .update(token.as_str(), PROJECTS_PATH, |doc: &mut ProjectsDocument| {
            let before = find_by_id(&doc.projects, &id).cloned();
            let updated = replace_by_id(&mut doc.projects, &id, project.clone(), NOT_FOUND)?;
            if before.as_ref() != Some(&updated) {
                doc.last_updated = Some(now_rfc3339());
            }
            Ok(updated)
        })
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let removed = state
        .repo
        .update(token.as_str(), PROJECTS_PATH, |doc: &mut ProjectsDocument| {
            let removed = delete_by_id(&mut doc.projects, &id, NOT_FOUND)?;
            doc.last_updated = Some(now_rfc3339());
            Ok(removed)
        })
        .await?;

    tracing::info!("Deleted project {}", removed.id);
    Ok(ApiResponse::success(removed))
}

// handlers/family/todos.rs - Todo lists and their items
//
// One document per member holds every list; items are nested inside lists.

use axum::{
    extract::{Extension, Path, State},
};
use serde_json::Value;

use crate::auth::FamilySession;
use crate::collection::find_by_id_mut;
use crate::error::ApiError;
use crate::handlers::utils::{delete_by_id, insert_new, parse_body, replace_by_id};
use crate::middleware::{authorize_member, ApiJson, ApiResponse, ApiResult, ProviderToken};
use crate::models::todo::todos_path;
use crate::models::{TodoItem, TodoList};
use crate::state::AppState;

const LIST_NOT_FOUND: &str = "Todo list not found";
const ITEM_NOT_FOUND: &str = "Todo item not found";

fn list_mut<'a>(lists: &'a mut [TodoList], list_id: &str) -> Result<&'a mut TodoList, ApiError> {
    find_by_id_mut(lists, list_id).ok_or_else(|| ApiError::not_found(LIST_NOT_FOUND))
}

/// GET /api/family/:member/todos
pub async fn list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
) -> ApiResult<Vec<TodoList>> {
    authorize_member(&session, &member)?;

    let lists: Vec<TodoList> = state.repo.load(token.as_str(), &todos_path(&member)).await;
    Ok(ApiResponse::success(lists))
}

/// POST /api/family/:member/todos
pub async fn create_list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path(member): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<TodoList> {
    authorize_member(&session, &member)?;

    let mut list: TodoList = parse_body(payload)?;
    list.validate()?;
    list.items.clear();

    let created = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            Ok(insert_new(lists, list.clone()))
        })
        .await?;

    Ok(ApiResponse::created(created))
}

/// PUT /api/family/:member/todos/:list_id - replaces list fields, keeps items
pub async fn update_list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, list_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<TodoList> {
    authorize_member(&session, &member)?;

    let list: TodoList = parse_body(payload)?;
    list.validate()?;

    let updated = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            replace_by_id(lists, &list_id, list.clone(), LIST_NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/family/:member/todos/:list_id
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, list_id)): Path<(String, String)>,
) -> ApiResult<TodoList> {
    authorize_member(&session, &member)?;

    let removed = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            delete_by_id(lists, &list_id, LIST_NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(removed))
}

/// POST /api/family/:member/todos/:list_id/items
pub async fn create_item(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, list_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<TodoItem> {
    authorize_member(&session, &member)?;

    let mut item: TodoItem = parse_body(payload)?;
    item.validate()?;
    item.normalize();

    let created = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            let list = list_mut(lists, &list_id)?;
            Ok(insert_new(&mut list.items, item.clone()))
        })
        .await?;

    Ok(ApiResponse::created(created))
}

/// PUT /api/family/:member/todos/:list_id/items/:item_id - full replace
pub async fn update_item(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, list_id, item_id)): Path<(String, String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<TodoItem> {
    authorize_member(&session, &member)?;

    let mut item: TodoItem = parse_body(payload)?;
    item.validate()?;
    item.normalize();

    let updated = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            let list = list_mut(lists, &list_id)?;
            replace_by_id(&mut list.items, &item_id, item.clone(), ITEM_NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/family/:member/todos/:list_id/items/:item_id
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(token): Extension<ProviderToken>,
    Extension(session): Extension<FamilySession>,
    Path((member, list_id, item_id)): Path<(String, String, String)>,
) -> ApiResult<TodoItem> {
    authorize_member(&session, &member)?;

    let removed = state
        .repo
        .update(token.as_str(), &todos_path(&member), |lists: &mut Vec<TodoList>| {
            let list = list_mut(lists, &list_id)?;
            delete_by_id(&mut list.items, &item_id, ITEM_NOT_FOUND)
        })
        .await?;

    Ok(ApiResponse::success(removed))
}

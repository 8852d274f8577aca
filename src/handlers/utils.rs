use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collection::{find_index_by_id, next_id, remove_by_id, upsert_by_id, Identified};
use crate::error::ApiError;
use crate::models::{now_rfc3339, Record};

/// Deserialize a JSON object body into a record
pub fn parse_body<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    if !payload.is_object() {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    }
    Ok(serde_json::from_value(payload)?)
}

/// Assign a fresh id and creation timestamps, then append
pub fn insert_new<T: Record>(items: &mut Vec<T>, mut item: T) -> T {
    item.set_id(next_id());
    item.stamp_created(&now_rfc3339());
    upsert_by_id(items, item.clone());
    item
}

/// Full replace of the record with `id`. Identical payloads leave the stored
/// record byte-for-byte unchanged, timestamps included.
pub fn replace_by_id<T: Record>(items: &mut Vec<T>, id: &str, mut incoming: T, missing: &str) -> Result<T, ApiError> {
    let idx = find_index_by_id(items, id).ok_or_else(|| ApiError::not_found(missing))?;

    incoming.set_id(id.to_string());
    incoming.carry_over(&items[idx]);
    if incoming != items[idx] {
        incoming.touch(&now_rfc3339());
    }

    upsert_by_id(items, incoming.clone());
    Ok(incoming)
}

pub fn delete_by_id<T: Identified>(items: &mut Vec<T>, id: &str, missing: &str) -> Result<T, ApiError> {
    remove_by_id(items, id).ok_or_else(|| ApiError::not_found(missing))
}

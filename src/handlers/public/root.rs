use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Family Hub API",
            "version": version,
            "environment": format!("{:?}", state.config.environment),
            "endpoints": {
                "health": "/health (public)",
                "track": "/api/analytics/track (public)",
                "projects": "/api/projects[/:id] (bearer)",
                "members": "/api/family/members[/:id] (bearer)",
                "settings": "/api/family/settings (bearer)",
                "login": "/api/family/login (bearer)",
                "analytics": "/api/analytics (bearer)",
                "calendar": "/api/family/:member/calendar[/:id] (bearer + X-Family-Token)",
                "finances": "/api/family/:member/finances[/:id|/summary] (bearer + X-Family-Token)",
                "todos": "/api/family/:member/todos[/:list_id[/items[/:item_id]]] (bearer + X-Family-Token)",
            }
        }
    }))
}

/// GET /health - liveness only; the document store is per-user and not probed
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "storage": state.config.storage.backend,
        }
    }))
}

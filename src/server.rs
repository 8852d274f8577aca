use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{family, protected, public};
use crate::middleware::{family_session_middleware, provider_token_middleware, FAMILY_TOKEN_HEADER};
use crate::state::AppState;

/// Full application router with global middleware applied
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/analytics/track", post(public::analytics_track))
        // Provider token required
        .merge(protected_routes(state.clone()))
        // Provider token + family session required
        .merge(family_routes(state.clone()));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    let router = if state.config.security.enable_cors {
        router.layer(cors_layer(&state))
    } else {
        router
    };

    router
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(FAMILY_TOKEN_HEADER),
        ])
        .allow_credentials(true)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Projects
        .route(
            "/api/projects",
            get(protected::projects_list).post(protected::projects_create),
        )
        .route(
            "/api/projects/:id",
            get(protected::projects_show)
                .put(protected::projects_update)
                .delete(protected::projects_delete),
        )
        // Family administration
        .route(
            "/api/family/members",
            get(protected::members_list).post(protected::members_create),
        )
        .route(
            "/api/family/members/:id",
            put(protected::members_update).delete(protected::members_delete),
        )
        .route(
            "/api/family/settings",
            get(protected::settings_get).put(protected::settings_put),
        )
        .route("/api/family/login", post(protected::family_login))
        // Analytics report
        .route("/api/analytics", get(protected::analytics_summary))
        .route_layer(from_fn_with_state(state, provider_token_middleware))
}

fn family_routes(state: AppState) -> Router<AppState> {
    let layers = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), provider_token_middleware))
        .layer(from_fn_with_state(state, family_session_middleware));

    Router::new()
        // Calendar
        .route(
            "/api/family/:member/calendar",
            get(family::calendar_list).post(family::calendar_create),
        )
        .route(
            "/api/family/:member/calendar/:id",
            put(family::calendar_update).delete(family::calendar_delete),
        )
        // Finances
        .route(
            "/api/family/:member/finances",
            get(family::finances_list).post(family::finances_create),
        )
        .route("/api/family/:member/finances/summary", get(family::finances_summary))
        .route(
            "/api/family/:member/finances/:id",
            put(family::finances_update).delete(family::finances_delete),
        )
        // Todos
        .route(
            "/api/family/:member/todos",
            get(family::todos_list).post(family::todos_create_list),
        )
        .route(
            "/api/family/:member/todos/:list_id",
            put(family::todos_update_list).delete(family::todos_delete_list),
        )
        .route(
            "/api/family/:member/todos/:list_id/items",
            post(family::todos_create_item),
        )
        .route(
            "/api/family/:member/todos/:list_id/items/:item_id",
            put(family::todos_update_item).delete(family::todos_delete_item),
        )
        .route_layer(layers)
}

/// Bind `0.0.0.0:<port>` and serve until the process exits
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Family Hub listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

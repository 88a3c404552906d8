//! HTTP server.
//!
//! Serves the JSON content API to mobile clients plus the single-post
//! page whose render counts a view.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `{prefix}/posts/` | Filtered, paginated full post objects |
//! | `GET`  | `{prefix}/categories/` | Every category with `icon_url` |
//! | `GET`  | `{prefix}/most-viewed/` | Top posts by views, compact objects |
//! | `GET`  | `/post/{id}` | HTML page for one post; records a view |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `{prefix}` is `[server].route_prefix` (default `/myapp/v1`). Each JSON
//! route also answers without its trailing slash.
//!
//! # Error Contract
//!
//! Malformed query parameters are never rejected; they coerce to
//! defaults. Store failures and unknown posts produce:
//!
//! ```json
//! { "error": { "code": "internal", "message": "..." } }
//! ```
//!
//! Error codes: `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based and
//! mobile web views can call the API directly.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use press_core::projection::{CategoryResponse, CompactPost, FullPost};
use press_core::query::{parse_int, RawParams};
use press_core::store::ContentStore;

use crate::categories::list_categories;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::most_viewed::most_viewed;
use crate::posts::list_posts;
use crate::render::render_post;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (wrapped in `Arc` for cheap cloning across handlers).
    config: Arc<Config>,
    /// Content backend shared by every request.
    store: Arc<dyn ContentStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn ContentStore>) -> Self {
        Self { config, store }
    }
}

/// Starts the HTTP server against the configured SQLite database.
///
/// Runs migrations first so a fresh database serves empty listings
/// instead of failing. Binds to `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store = SqliteStore::with_default_per_page(pool, config.listing.default_per_page);

    let state = AppState::new(Arc::new(config.clone()), Arc::new(store));
    serve(state).await
}

/// Serves an already-built [`AppState`], e.g. one backed by a custom store.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.server.bind.clone();
    let prefix = state.config.server.route_prefix.clone();
    tracing::info!(
        views_mode = state.config.views.mode.as_str(),
        "routes: {p}/posts/ {p}/categories/ {p}/most-viewed/ /post/{{id}} /health",
        p = prefix
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("press-api listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the full router: API routes under the configured prefix, plus
/// the render and health routes at the root.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/posts", get(handle_posts))
        .route("/posts/", get(handle_posts))
        .route("/categories", get(handle_categories))
        .route("/categories/", get(handle_categories))
        .route("/most-viewed", get(handle_most_viewed))
        .route("/most-viewed/", get(handle_most_viewed));

    let prefix = state.config.server.route_prefix.clone();
    let root = Router::new()
        .route("/health", get(handle_health))
        .route("/post/{id}", get(handle_render_post));

    let router = if prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(&prefix, api)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (`"not_found"`, `"internal"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Store and other unexpected failures surface as a generic 500.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("request failed: {:#}", err);
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET {prefix}/posts/ ============

/// A query string that fails to decode is treated as empty rather than
/// answered with 400.
fn raw_params(query: Result<Query<RawParams>, QueryRejection>) -> RawParams {
    match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!("ignoring undecodable query string: {}", rejection);
            RawParams::new()
        }
    }
}

async fn handle_posts(
    State(state): State<AppState>,
    query: Result<Query<RawParams>, QueryRejection>,
) -> Result<Json<Vec<FullPost>>, AppError> {
    let raw = raw_params(query);
    let posts = list_posts(state.store.as_ref(), &state.config, &raw).await?;
    Ok(Json(posts))
}

// ============ GET {prefix}/categories/ ============

async fn handle_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = list_categories(state.store.as_ref()).await?;
    Ok(Json(categories))
}

// ============ GET {prefix}/most-viewed/ ============

async fn handle_most_viewed(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompactPost>>, AppError> {
    let posts = most_viewed(state.store.as_ref(), &state.config).await?;
    Ok(Json(posts))
}

// ============ GET /post/{id} ============

async fn handle_render_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post_id = parse_int(&id);
    let rendered = render_post(state.store.as_ref(), &state.config, post_id)
        .await?
        .ok_or_else(|| not_found(format!("post not found: {}", id)))?;
    Ok(Html(rendered.html))
}

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use velora_core::services::DatabaseService;

use crate::auth::{extract_session_token, verify_session_token};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::HttpAssetStore;
use crate::{articles, gallery};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseService,
    pub store: Arc<HttpAssetStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, db: DatabaseService) -> Self {
        Self {
            store: Arc::new(HttpAssetStore::new(config.clone())),
            config,
            db,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    // Multipart batches can carry several files, so the request cap is a
    // multiple of the per-file limit.
    let body_limit = usize::try_from(state.config.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(8);

    // Reads are public; everything that mutates sits behind the admin gate.
    let admin_routes = Router::new()
        .route("/articles", post(articles::create_article))
        .route(
            "/articles/{id}",
            put(articles::update_article).delete(articles::delete_article),
        )
        .route("/articles/{id}/delete", post(articles::delete_article))
        .route("/gallery/{folder}/upload", post(gallery::upload_gallery))
        .route("/gallery/{folder}/delete", post(gallery::delete_gallery))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public_routes = Router::new()
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route("/gallery/{folder}", get(gallery::list_gallery));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", public_routes.merge(admin_routes))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_session_token(request.headers())?;
    verify_session_token(token, &state.config.admin_session_token)?;
    Ok(next.run(request).await)
}

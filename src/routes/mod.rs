use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    models::Limits,
    services::{AutocompleteIndex, SearchService, TmdbClient},
};

pub mod catalog;
pub mod search;
pub mod tmdb;

/// Shared handler state
pub struct AppState {
    pub search: SearchService,
    pub autocomplete: AutocompleteIndex,
    pub tmdb: TmdbClient,
    pub limits: Limits,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search::search))
        .route("/discover", get(search::discover))
        .route("/similar", get(catalog::similar))
        .route("/details", get(catalog::details))
        .route("/autocomplete", get(catalog::autocomplete))
        .route("/tmdb/*path", get(tmdb::proxy))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{MediaItem, SearchParams},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<MediaItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscoverParams {
    content_types: Option<String>,
    payment_types: Option<String>,
    limit: Option<String>,
}

/// Handler for the search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let request = params.into_request(&state.limits)?;

    tracing::info!(
        request_id = %request_id,
        query = ?request.query,
        ids = request.movie_ids.len(),
        facets = request.selection.facet_count(),
        show_similar = request.show_similar,
        limit = request.limit,
        "Processing search request"
    );

    let outcome = state.search.search(&request).await?;

    Ok(Json(SearchResponse {
        results: outcome.results,
    }))
}

/// Handler for the discover endpoint
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<DiscoverParams>,
) -> AppResult<Json<SearchResponse>> {
    let request = SearchParams {
        content_types: params.content_types,
        payment_types: params.payment_types,
        limit: params.limit,
        ..Default::default()
    }
    .into_request(&state.limits)?;

    tracing::info!(
        request_id = %request_id,
        content_types = ?request.content_types,
        limit = request.limit,
        "Processing discover request"
    );

    let outcome = state.search.search(&request).await?;

    Ok(Json(SearchResponse {
        results: outcome.results,
    }))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        search::{parse_content_types, parse_limit},
        Limits, MediaItem,
    },
    routes::{search::SearchResponse, AppState},
    services::Suggestion,
};

/// Default size of a "more like this" row
const SIMILAR_DEFAULT_LIMIT: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    id: Option<String>,
    content_types: Option<String>,
    limit: Option<String>,
}

impl ItemParams {
    fn require_id(&self) -> AppResult<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing movie ID".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteParams {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub results: Vec<Suggestion>,
}

/// Handler for "more like this"
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ItemParams>,
) -> AppResult<Json<SearchResponse>> {
    let id = params.require_id()?;
    let content_types = parse_content_types(params.content_types.as_deref())?;
    let limit = Limits {
        default_limit: SIMILAR_DEFAULT_LIMIT,
        max_limit: state.limits.max_limit,
    }
    .resolve(parse_limit(params.limit.as_deref()));

    tracing::info!(request_id = %request_id, id = %id, limit = limit, "Processing similar request");

    let outcome = state.search.similar(id, &content_types, limit).await?;

    tracing::info!(
        request_id = %request_id,
        matched_by = %outcome.matched_by,
        results = outcome.results.len(),
        "Similar request completed"
    );

    Ok(Json(SearchResponse {
        results: outcome.results,
    }))
}

/// Handler for single-item details
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ItemParams>,
) -> AppResult<Json<MediaItem>> {
    let id = params.require_id()?;
    let content_types = parse_content_types(params.content_types.as_deref())?;

    tracing::info!(request_id = %request_id, id = %id, "Processing details request");

    let item = state.search.details(id, &content_types).await?;
    Ok(Json(item))
}

/// Handler for autocomplete
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteParams>,
) -> Json<AutocompleteResponse> {
    let results = state
        .autocomplete
        .suggest(params.query.as_deref().unwrap_or_default());
    Json(AutocompleteResponse { results })
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{error::AppResult, middleware::RequestId, routes::AppState};

/// Handler for the TMDB pass-through
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<(StatusCode, Json<Value>)> {
    tracing::debug!(request_id = %request_id, path = %path, "Proxying TMDB request");

    let response = state.tmdb.proxy(&path, &params).await?;
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    Ok((status, Json(response.body)))
}

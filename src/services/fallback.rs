use std::{sync::Arc, time::Duration};

use crate::{
    db::{DocumentStore, Filter, FindQuery, SortBy},
    error::AppResult,
    models::{ContentType, MediaItem},
    services::{
        fan_out::fan_out,
        ranking::{merge_ranked, RankBy},
    },
};

/// Extra rows fetched per collection so dropping the source still fills `limit`
const OVERFETCH: usize = 1;

/// "More like this" for items without a stored embedding
///
/// Returns the most popular items sharing at least one genre with `source`,
/// never `source` itself. An item with no genres has no neighbours: the
/// result is empty, not an error.
pub async fn similar_by_genre(
    store: &Arc<dyn DocumentStore>,
    source: &MediaItem,
    targets: &[ContentType],
    limit: usize,
    timeout: Duration,
) -> AppResult<Vec<MediaItem>> {
    let genres = source.genre_names();
    if genres.is_empty() {
        tracing::info!(
            id = %source.id,
            collection = %source.content_type,
            "No embedding and no genres, nothing to compare against"
        );
        return Ok(Vec::new());
    }

    tracing::info!(
        id = %source.id,
        genres = ?genres,
        "Falling back to genre-overlap similarity"
    );

    let query = FindQuery::new(Filter::field_in("genres", genres), limit + OVERFETCH)
        .sorted(SortBy::popularity());

    let batches: Vec<Vec<MediaItem>> = fan_out(store, targets, &query, timeout)
        .await?
        .into_iter()
        .map(|batch| {
            batch
                .into_iter()
                .filter(|item| item.key() != source.key())
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(merge_ranked(batches, RankBy::Popularity, limit))
}

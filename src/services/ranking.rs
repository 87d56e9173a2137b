use std::collections::HashSet;

use crate::models::MediaItem;

/// Ordering applied to merged results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Vector similarity, highest first
    Similarity,
    /// Popularity, highest first; missing popularity counts as zero
    Popularity,
}

/// Merges per-collection result lists into one ranked list
///
/// Duplicates are dropped by collection-scoped identity (first occurrence
/// wins), so the same id in `movie` and `tv` is kept twice. Truncation happens
/// only after dedupe and sort.
pub fn merge_ranked(batches: Vec<Vec<MediaItem>>, rank_by: RankBy, limit: usize) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    let mut merged: Vec<MediaItem> = batches
        .into_iter()
        .flatten()
        .filter(|item| seen.insert((item.content_type, item.id.clone())))
        .collect();

    match rank_by {
        RankBy::Similarity => merged.sort_by(|a, b| {
            let score_a = a.similarity.unwrap_or(0.0);
            let score_b = b.similarity.unwrap_or(0.0);
            score_b.total_cmp(&score_a)
        }),
        RankBy::Popularity => {
            merged.sort_by(|a, b| b.rank_popularity().total_cmp(&a.rank_popularity()))
        }
    }

    merged.truncate(limit);
    merged
}

use crate::{
    db::filter::Filter,
    error::AppResult,
    models::{ContentType, MediaItem},
};

/// Ordering requested from the store
#[derive(Debug, Clone, PartialEq)]
pub enum SortBy {
    /// Sort on a document field
    Field { field: String, descending: bool },
    /// Nearest neighbours of the given embedding, exposing similarity scores
    Vector(Vec<f32>),
}

impl SortBy {
    pub fn popularity() -> Self {
        SortBy::Field {
            field: "popularity".to_string(),
            descending: true,
        }
    }
}

/// One find call against one collection
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Option<SortBy>,
    pub limit: usize,
    /// Return stored embeddings alongside the documents
    pub include_vector: bool,
}

impl FindQuery {
    pub fn new(filter: Filter, limit: usize) -> Self {
        Self {
            filter,
            sort: None,
            limit,
            include_vector: false,
        }
    }

    pub fn sorted(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_vector(mut self, include: bool) -> Self {
        self.include_vector = include;
        self
    }
}

/// Document store the search pipeline queries
///
/// Implementations decode through [`crate::db::StoredDocument`] so every
/// backend hands out the same canonical items.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Finds documents in one collection
    async fn find(&self, collection: ContentType, query: &FindQuery) -> AppResult<Vec<MediaItem>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

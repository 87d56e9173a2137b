use std::{fmt::Display, sync::Arc, time::Duration, time::Instant};

use crate::{
    cached,
    db::{CacheKey, DocumentStore, Filter, FindQuery, ResultCache, SortBy},
    error::{AppError, AppResult},
    models::{ContentType, ItemId, MediaItem, SearchRequest},
    services::{
        embedding::EmbeddingService,
        fallback::similar_by_genre,
        fan_out::fan_out,
        filter_compiler::FilterCompiler,
        ranking::{merge_ranked, RankBy},
    },
};

/// Which step of the resolver produced a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    ExactId,
    ExactTitle,
    Listing,
    Similarity,
    GenreFallback,
}

impl Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchKind::ExactId => "exact_id",
            MatchKind::ExactTitle => "exact_title",
            MatchKind::Listing => "listing",
            MatchKind::Similarity => "similarity",
            MatchKind::GenreFallback => "genre_fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<MediaItem>,
    pub matched_by: MatchKind,
}

impl SearchOutcome {
    fn new(results: Vec<MediaItem>, matched_by: MatchKind) -> Self {
        Self {
            results,
            matched_by,
        }
    }
}

/// Upper bounds for external calls
#[derive(Debug, Clone, Copy)]
pub struct SearchTimeouts {
    pub store: Duration,
    pub embedding: Duration,
}

impl Default for SearchTimeouts {
    fn default() -> Self {
        Self {
            store: Duration::from_secs(5),
            embedding: Duration::from_secs(10),
        }
    }
}

/// Resolves search requests against the catalog
///
/// Steps, first success wins:
/// 1. exact ids
/// 2. exact title
/// 3. filtered listing when there is no free text
/// 4. vector similarity
///
/// Steps 1 and 2 continue into step 4 with the first match's stored embedding
/// when `show_similar` is set, or into the genre-overlap fallback when that
/// match has no embedding.
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingService>,
    cache: Arc<dyn ResultCache>,
    compiler: FilterCompiler,
    timeouts: SearchTimeouts,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingService>,
        cache: Arc<dyn ResultCache>,
        compiler: FilterCompiler,
        timeouts: SearchTimeouts,
    ) -> Self {
        Self {
            store,
            embedder,
            cache,
            compiler,
            timeouts,
        }
    }

    /// Runs a search request through the resolver
    pub async fn search(&self, request: &SearchRequest) -> AppResult<SearchOutcome> {
        let start = Instant::now();
        let outcome = self.resolve(request).await?;

        tracing::info!(
            matched_by = %outcome.matched_by,
            results = outcome.results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search resolved"
        );

        Ok(outcome)
    }

    async fn resolve(&self, request: &SearchRequest) -> AppResult<SearchOutcome> {
        if let Some(key) = Self::cache_key(request) {
            let results = cached!(self.cache, key, self.filtered_listing(request))?;
            return Ok(SearchOutcome::new(results, MatchKind::Listing));
        }

        let other_selections = request.movie_ids.len() + usize::from(request.query.is_some());
        let filter = self.compiler.compile(&request.selection, other_selections);

        if !request.movie_ids.is_empty() {
            let matches = self
                .fetch_by_ids(&request.movie_ids, &request.content_types, request.show_similar)
                .await?;

            if !matches.is_empty() {
                if !request.show_similar {
                    return Ok(SearchOutcome::new(matches, MatchKind::ExactId));
                }
                return self.expand_similar(request, &filter, &matches).await;
            }

            tracing::info!(ids = ?request.movie_ids, "No rows for requested ids");
        }

        if let Some(text) = &request.query {
            let matches = self
                .fetch_exact_title(text, &request.content_types, request.limit, request.show_similar)
                .await?;

            if !matches.is_empty() {
                if !request.show_similar {
                    return Ok(SearchOutcome::new(matches, MatchKind::ExactTitle));
                }
                return self.expand_similar(request, &filter, &matches).await;
            }

            let vector = self.embed(text).await?;
            let results = self.vector_search(request, &filter, vector).await?;
            return Ok(SearchOutcome::new(results, MatchKind::Similarity));
        }

        let results = self.listing_with(request, filter).await?;
        Ok(SearchOutcome::new(results, MatchKind::Listing))
    }

    /// Items similar to one catalog item, never including the item itself
    pub async fn similar(
        &self,
        id: &str,
        content_types: &[ContentType],
        limit: usize,
    ) -> AppResult<SearchOutcome> {
        let source = self
            .fetch_by_ids(&[id.to_string()], content_types, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("No movie or show with id {}", id)))?;

        let Some(vector) = source.embedding.clone() else {
            let results = similar_by_genre(
                &self.store,
                &source,
                content_types,
                limit,
                self.timeouts.store,
            )
            .await?;
            return Ok(SearchOutcome::new(results, MatchKind::GenreFallback));
        };

        let query = FindQuery::new(Filter::all(), limit + 1).sorted(SortBy::Vector(vector));
        let batches: Vec<Vec<MediaItem>> = fan_out(&self.store, content_types, &query, self.timeouts.store)
            .await?
            .into_iter()
            .map(|batch| {
                batch
                    .into_iter()
                    .filter(|item| item.key() != source.key())
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(SearchOutcome::new(
            merge_ranked(batches, RankBy::Similarity, limit),
            MatchKind::Similarity,
        ))
    }

    /// A single item by id
    pub async fn details(&self, id: &str, content_types: &[ContentType]) -> AppResult<MediaItem> {
        self.fetch_by_ids(&[id.to_string()], content_types, false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("No movie or show with id {}", id)))
    }

    /// Only bare genre browses and unfiltered discovers are cached
    fn cache_key(request: &SearchRequest) -> Option<CacheKey> {
        if request.is_genre_browse() {
            return Some(CacheKey::genre_browse(
                &request.selection.genres,
                &request.content_types,
                &request.selection.payment_types,
                request.limit,
            ));
        }
        if request.is_discover() {
            return Some(CacheKey::discover(
                &request.content_types,
                &request.selection.payment_types,
                request.limit,
            ));
        }
        None
    }

    async fn filtered_listing(&self, request: &SearchRequest) -> AppResult<Vec<MediaItem>> {
        let filter = self.compiler.compile(&request.selection, 0);
        self.listing_with(request, filter).await
    }

    /// Filtered listing, popularity-sorted when anything narrows it
    async fn listing_with(&self, request: &SearchRequest, filter: Filter) -> AppResult<Vec<MediaItem>> {
        let sort = (!filter.is_match_all()).then(SortBy::popularity);
        let mut query = FindQuery::new(filter, request.limit);
        query.sort = sort;

        let batches = fan_out(&self.store, &request.content_types, &query, self.timeouts.store).await?;
        Ok(merge_ranked(batches, RankBy::Popularity, request.limit))
    }

    async fn fetch_by_ids(
        &self,
        ids: &[String],
        content_types: &[ContentType],
        include_vector: bool,
    ) -> AppResult<Vec<MediaItem>> {
        let values: Vec<_> = ids.iter().flat_map(|id| ItemId::lookup_values(id)).collect();
        let query = FindQuery::new(Filter::field_in("_id", values), ids.len()).with_vector(include_vector);

        let batches: Vec<Vec<MediaItem>> = fan_out(&self.store, content_types, &query, self.timeouts.store)
            .await?
            .into_iter()
            .map(|batch| {
                batch
                    .into_iter()
                    .filter(|item| ids.iter().any(|id| item.id.matches(id)))
                    .collect::<Vec<_>>()
            })
            .collect();

        let found: usize = batches.iter().map(Vec::len).sum();
        tracing::debug!(requested = ids.len(), found = found, "Exact id lookup");
        Ok(merge_ranked(batches, RankBy::Popularity, found))
    }

    async fn fetch_exact_title(
        &self,
        text: &str,
        content_types: &[ContentType],
        limit: usize,
        include_vector: bool,
    ) -> AppResult<Vec<MediaItem>> {
        // Folded equality does the matching; the spelled-out variants cover
        // Astra documents loaded before the folded copies existed
        let variants = title_variants(text);
        let filter = Filter::or(vec![
            Filter::eq_folded("title", text),
            Filter::eq_folded("name", text),
            Filter::field_in("title", variants.clone()),
            Filter::field_in("name", variants),
        ]);
        let query = FindQuery::new(filter, limit).with_vector(include_vector);

        let folded = text.to_lowercase();
        let batches: Vec<Vec<MediaItem>> = fan_out(&self.store, content_types, &query, self.timeouts.store)
            .await?
            .into_iter()
            .map(|batch| {
                batch
                    .into_iter()
                    .filter(|item| {
                        [item.title.as_deref(), item.name.as_deref()]
                            .into_iter()
                            .flatten()
                            .any(|title| title.to_lowercase() == folded)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(merge_ranked(batches, RankBy::Popularity, limit))
    }

    /// Continues an exact match into similarity search
    async fn expand_similar(
        &self,
        request: &SearchRequest,
        filter: &Filter,
        matches: &[MediaItem],
    ) -> AppResult<SearchOutcome> {
        let Some(first) = matches.first() else {
            return Ok(SearchOutcome::new(Vec::new(), MatchKind::Similarity));
        };

        match &first.embedding {
            Some(vector) => {
                let results = self.vector_search(request, filter, vector.clone()).await?;
                Ok(SearchOutcome::new(results, MatchKind::Similarity))
            }
            None => {
                let results = similar_by_genre(
                    &self.store,
                    first,
                    &request.content_types,
                    request.limit,
                    self.timeouts.store,
                )
                .await?;
                Ok(SearchOutcome::new(results, MatchKind::GenreFallback))
            }
        }
    }

    async fn vector_search(
        &self,
        request: &SearchRequest,
        filter: &Filter,
        vector: Vec<f32>,
    ) -> AppResult<Vec<MediaItem>> {
        let query = FindQuery::new(filter.clone(), request.limit).sorted(SortBy::Vector(vector));
        let batches = fan_out(&self.store, &request.content_types, &query, self.timeouts.store).await?;
        Ok(merge_ranked(batches, RankBy::Similarity, request.limit))
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let result = match tokio::time::timeout(self.timeouts.embedding, self.embedder.embed(text)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "Embedding exceeded {}ms",
                self.timeouts.embedding.as_millis()
            ))),
        };

        result.map_err(|e| {
            tracing::error!(error = %e, query = %text, "Query embedding failed");
            e
        })
    }
}

/// Spellings the title may be stored under: as typed, lower case, title case
fn title_variants(text: &str) -> Vec<String> {
    let title_case = text
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");

    let mut variants = vec![text.to_string(), text.to_lowercase(), title_case];
    variants.sort();
    variants.dedup();
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::cache::tests::ManualClock;
    use crate::db::{MemoryCache, MemoryStore};
    use crate::models::{Limits, SearchParams};
    use crate::services::provider_aliases::ProviderAliases;
    use mockall::mock;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        pub Embedder {}

        #[async_trait::async_trait]
        impl EmbeddingService for Embedder {
            async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
            fn name(&self) -> &'static str;
        }
    }

    /// Memory store that counts find calls
    struct CountingStore {
        inner: MemoryStore,
        finds: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl DocumentStore for CountingStore {
        async fn find(&self, collection: ContentType, query: &FindQuery) -> AppResult<Vec<MediaItem>> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find(collection, query).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn movies() -> Vec<Value> {
        vec![
            json!({
                "_id": "348", "title": "Alien", "popularity": 40.0, "vote_average": 8.2,
                "genres": ["Horror", "Science Fiction"], "$vector": [1.0, 0.0, 0.0],
                "watch_providers": { "US": { "stream": ["Hulu"] } }
            }),
            json!({
                "_id": "679", "title": "Aliens", "popularity": 35.0, "vote_average": 7.9,
                "genres": ["Action", "Science Fiction"], "$vector": [0.9, 0.1, 0.0],
                "watch_providers": { "US": { "stream": ["Disney Plus"] } }
            }),
            json!({
                "_id": "694", "title": "The Shining", "popularity": 30.0, "vote_average": 8.2,
                "genres": ["Horror"], "$vector": [0.0, 1.0, 0.0],
                "watch_providers": { "US": { "rent": ["Apple TV"] } }
            }),
            json!({
                "_id": "4232", "title": "Scream", "popularity": 25.0, "vote_average": 6.9,
                "genres": ["Horror"], "$vector": [0.1, 0.9, 0.0],
                "watch_providers": { "US": { "stream": ["Paramount+"] } }
            }),
            json!({
                "_id": "10144", "title": "The Little Mermaid", "popularity": 20.0, "vote_average": 7.3,
                "genres": ["Animation"],
                "watch_providers": { "US": { "stream": ["Disney+"] } }
            }),
            json!({
                "_id": "9552", "title": "The Exorcist", "popularity": 22.0, "vote_average": 7.7,
                "genres": ["Horror"], "$vector": [0.0, 0.8, 0.2],
                "watch_providers": { "US": { "stream": ["Max"] } }
            }),
        ]
    }

    fn shows() -> Vec<Value> {
        vec![
            json!({
                "_id": "348", "name": "Stranger Things", "popularity": 90.0, "vote_average": 8.6,
                "genres": [{ "id": 18, "name": "Drama" }, { "id": 9648, "name": "Mystery" }],
                "$vector": [0.2, 0.2, 0.9],
                "watch_providers": { "US": { "stream": ["Netflix"] } }
            }),
            json!({
                "_id": "1100", "name": "Alien", "popularity": 5.0, "vote_average": 6.0,
                "genres": ["Horror"]
            }),
        ]
    }

    fn catalog() -> MemoryStore {
        MemoryStore::new()
            .with_documents(ContentType::Movie, movies())
            .with_documents(ContentType::Tv, shows())
    }

    fn create_service(store: Arc<dyn DocumentStore>, embedder: MockEmbedder) -> SearchService {
        SearchService::new(
            store,
            Arc::new(embedder),
            Arc::new(MemoryCache::new(Duration::from_secs(3600), 100)),
            FilterCompiler::new(ProviderAliases::default(), "US"),
            SearchTimeouts::default(),
        )
    }

    fn no_embedding() -> MockEmbedder {
        let mut embedder = MockEmbedder::new();
        embedder.expect_embed().never();
        embedder
    }

    fn request(params: SearchParams) -> SearchRequest {
        params.into_request(&Limits::default()).unwrap()
    }

    fn titles(outcome: &SearchOutcome) -> Vec<&str> {
        outcome
            .results
            .iter()
            .filter_map(|item| item.display_title())
            .collect()
    }

    #[tokio::test]
    async fn test_exact_ids_short_circuit_without_embedding() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                movie_id: Some("694,999999".to_string()),
                query: Some("ignored text".to_string()),
                content_types: Some("movies".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::ExactId);
        assert_eq!(titles(&outcome), vec!["The Shining"]);
    }

    #[tokio::test]
    async fn test_exact_ids_match_in_every_collection() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                movie_id: Some("348".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::ExactId);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results.iter().any(|i| i.content_type == ContentType::Movie));
        assert!(outcome.results.iter().any(|i| i.content_type == ContentType::Tv));
    }

    #[tokio::test]
    async fn test_exact_title_returns_only_exact_matches() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                query: Some("alien".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::ExactTitle);
        assert_eq!(titles(&outcome), vec!["Alien", "Alien"]);
        assert!(!titles(&outcome).contains(&"Aliens"));
    }

    #[tokio::test]
    async fn test_exact_title_ignores_case_of_small_words() {
        let store = MemoryStore::new().with_documents(
            ContentType::Movie,
            vec![
                json!({ "_id": "1830", "title": "Lord of War", "popularity": 5.0, "$vector": [1.0, 0.0] }),
                json!({ "_id": "77", "title": "Other", "popularity": 9.0, "$vector": [1.0, 0.0] }),
            ],
        );
        let service = create_service(Arc::new(store), no_embedding());

        for query in ["lord of war", "LORD OF WAR", "Lord Of War"] {
            let outcome = service
                .search(&request(SearchParams {
                    query: Some(query.to_string()),
                    ..Default::default()
                }))
                .await
                .unwrap();

            assert_eq!(outcome.matched_by, MatchKind::ExactTitle, "{}", query);
            assert_eq!(titles(&outcome), vec!["Lord of War"]);
        }
    }

    #[tokio::test]
    async fn test_exact_title_show_similar_reuses_stored_vector() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                query: Some("Alien".to_string()),
                content_types: Some("movies".to_string()),
                show_similar: Some("true".to_string()),
                limit: Some("3".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::Similarity);
        assert_eq!(titles(&outcome), vec!["Alien", "Aliens", "Scream"]);
    }

    #[tokio::test]
    async fn test_show_similar_without_embedding_falls_back_to_genres() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                movie_id: Some("1100".to_string()),
                content_types: Some("tvshows,movies".to_string()),
                show_similar: Some("true".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::GenreFallback);
        assert_eq!(
            titles(&outcome),
            vec!["Alien", "The Shining", "Scream", "The Exorcist"]
        );
        assert!(outcome
            .results
            .iter()
            .all(|i| i.content_type == ContentType::Movie));
    }

    #[tokio::test]
    async fn test_free_text_without_exact_hit_uses_embedding_and_filter() {
        let mut embedder = MockEmbedder::new();
        embedder
            .expect_embed()
            .times(1)
            .returning(|_| Ok(vec![0.0, 1.0, 0.0]));
        let service = create_service(Arc::new(catalog()), embedder);

        let outcome = service
            .search(&request(SearchParams {
                query: Some("haunted hotel".to_string()),
                genre: Some("Horror".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::Similarity);
        assert_eq!(
            titles(&outcome),
            vec!["The Shining", "Scream", "The Exorcist", "Alien"]
        );
        let scores: Vec<f32> = outcome.results.iter().filter_map(|i| i.similarity).collect();
        assert_eq!(scores.len(), 4);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let mut embedder = MockEmbedder::new();
        embedder
            .expect_embed()
            .times(1)
            .returning(|_| Err(AppError::Upstream("OpenAI API error: quota".to_string())));
        let service = create_service(Arc::new(catalog()), embedder);

        let result = service
            .search(&request(SearchParams {
                query: Some("space trucker horror".to_string()),
                ..Default::default()
            }))
            .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_single_genre_browse_with_stream_payment() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                genre: Some("Horror".to_string()),
                payment_types: Some("stream".to_string()),
                limit: Some("20".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        // Scream is under the rating floor, The Shining is rent-only, the Alien
        // show has no providers
        assert_eq!(outcome.matched_by, MatchKind::Listing);
        assert_eq!(titles(&outcome), vec!["Alien", "The Exorcist"]);
    }

    #[tokio::test]
    async fn test_provider_alias_matches_legacy_label() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&request(SearchParams {
                providers: Some("Disney+".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(titles(&outcome), vec!["Aliens", "The Little Mermaid"]);
    }

    #[tokio::test]
    async fn test_genre_browse_is_cached_until_ttl() {
        let finds = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(CountingStore {
            inner: catalog(),
            finds: finds.clone(),
        });
        let clock = Arc::new(ManualClock::new());
        let service = SearchService::new(
            store,
            Arc::new(no_embedding()),
            Arc::new(MemoryCache::with_clock(Duration::from_secs(3600), 100, clock.clone())),
            FilterCompiler::new(ProviderAliases::default(), "US"),
            SearchTimeouts::default(),
        );
        let browse = request(SearchParams {
            genre: Some("Action".to_string()),
            content_types: Some("movies".to_string()),
            limit: Some("20".to_string()),
            ..Default::default()
        });

        let first = service.search(&browse).await.unwrap();
        let second = service.search(&browse).await.unwrap();
        assert_eq!(finds.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        clock.advance(Duration::from_secs(3601));
        service.search(&browse).await.unwrap();
        assert_eq!(finds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_discover_is_unsorted_query_ranked_by_popularity() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .search(&SearchRequest::discover(ContentType::ALL.to_vec(), 3))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::Listing);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].display_title(), Some("Stranger Things"));
    }

    #[tokio::test]
    async fn test_similar_excludes_source() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let outcome = service
            .similar("694", &[ContentType::Movie], 2)
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchKind::Similarity);
        assert_eq!(titles(&outcome), vec!["Scream", "The Exorcist"]);
    }

    #[tokio::test]
    async fn test_similar_unknown_id_is_not_found() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let result = service.similar("404", &ContentType::ALL, 6).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_details() {
        let service = create_service(Arc::new(catalog()), no_embedding());

        let item = service.details("10144", &ContentType::ALL).await.unwrap();
        assert_eq!(item.display_title(), Some("The Little Mermaid"));
        assert!(item.embedding.is_none());

        let result = service.details("1", &ContentType::ALL).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_title_variants() {
        assert_eq!(
            title_variants("the DARK knight"),
            vec!["The Dark Knight", "the DARK knight", "the dark knight"]
        );
        assert_eq!(title_variants("up"), vec!["Up", "up"]);
    }
}

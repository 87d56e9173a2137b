use serde_json::Value;
use std::{cmp::Ordering, collections::HashMap, path::Path};

use crate::{
    db::{
        astra::CollectionNames,
        document::StoredDocument,
        filter::lookup_path,
        store::{DocumentStore, FindQuery, SortBy},
        vector::{cosine_similarity, normalize_vector},
    },
    error::{AppError, AppResult},
    models::{ContentType, MediaItem},
};

/// Document store backed by raw JSON documents held in memory
///
/// Evaluates the same filter tree and sorts the Data API does, which makes it
/// usable both for local catalogs and as a test double.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: HashMap<ContentType, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds raw documents to a collection
    pub fn with_documents(mut self, collection: ContentType, docs: Vec<Value>) -> Self {
        self.collections.entry(collection).or_default().extend(docs);
        self
    }

    /// Loads a catalog file keyed by collection name
    ///
    /// Expects `{"movies2026": [...], "tvshows2026": [...]}`; either key may be absent.
    pub fn from_json_file(path: impl AsRef<Path>, names: &CollectionNames) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog: Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid catalog JSON: {}", e)))?;

        let mut store = Self::new();
        for content_type in ContentType::ALL {
            let docs = catalog
                .get(names.for_type(content_type))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            tracing::info!(
                collection = %content_type,
                documents = docs.len(),
                "Loaded catalog collection"
            );
            store = store.with_documents(content_type, docs);
        }

        Ok(store)
    }

    pub fn len(&self, collection: ContentType) -> usize {
        self.collections.get(&collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    let value_a = lookup_path(a, field).and_then(Value::as_f64);
    let value_b = lookup_path(b, field).and_then(Value::as_f64);
    match (value_a, value_b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: ContentType, query: &FindQuery) -> AppResult<Vec<MediaItem>> {
        let Some(docs) = self.collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Value> = docs
            .iter()
            .filter(|doc| query.filter.matches(doc))
            .cloned()
            .collect();

        match &query.sort {
            Some(SortBy::Field { field, descending }) => {
                matched.sort_by(|a, b| {
                    let ordering = compare_field(a, b, field);
                    if *descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
            Some(SortBy::Vector(target)) => {
                // Documents without an embedding cannot be ranked by vector
                let mut scored: Vec<(f32, Value)> = matched
                    .into_iter()
                    .filter_map(|doc| {
                        let vector = normalize_vector(doc.get("$vector")).into_vec()?;
                        Some((cosine_similarity(target, &vector), doc))
                    })
                    .collect();
                scored.sort_by(|a, b| b.0.total_cmp(&a.0));
                matched = scored
                    .into_iter()
                    .map(|(score, mut doc)| {
                        if let Some(map) = doc.as_object_mut() {
                            map.insert("$similarity".to_string(), Value::from(score));
                        }
                        doc
                    })
                    .collect();
            }
            None => {}
        }

        matched.truncate(query.limit);

        Ok(matched
            .into_iter()
            .map(|mut doc| {
                if !query.include_vector {
                    if let Some(map) = doc.as_object_mut() {
                        map.remove("$vector");
                    }
                }
                doc
            })
            .filter_map(|doc| StoredDocument::from_value(doc, collection))
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Astra Data API document store
///
/// Every find is a single `POST {endpoint}/api/json/v1/{keyspace}/{collection}`
/// with a `{"find": ...}` command body. Filters are rendered in the API's
/// Mongo-style syntax by [`Filter::to_query_json`](crate::db::Filter::to_query_json).
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::{Duration, Instant};

use crate::{
    db::{
        document::StoredDocument,
        store::{DocumentStore, FindQuery, SortBy},
    },
    error::{AppError, AppResult},
    models::{ContentType, MediaItem},
};

/// Collection names per content type
#[derive(Debug, Clone)]
pub struct CollectionNames {
    pub movies: String,
    pub tv: String,
}

impl CollectionNames {
    pub fn for_type(&self, content_type: ContentType) -> &str {
        match content_type {
            ContentType::Movie => &self.movies,
            ContentType::Tv => &self.tv,
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            movies: "movies2026".to_string(),
            tv: "tvshows2026".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AstraStore {
    http_client: HttpClient,
    api_endpoint: String,
    token: String,
    keyspace: String,
    collections: CollectionNames,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    data: Option<FindData>,
    #[serde(default)]
    errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
struct FindData {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl AstraStore {
    pub fn new(
        api_endpoint: String,
        token: String,
        keyspace: String,
        collections: CollectionNames,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            token,
            keyspace,
            collections,
        })
    }

    fn collection_url(&self, content_type: ContentType) -> String {
        format!(
            "{}/api/json/v1/{}/{}",
            self.api_endpoint,
            self.keyspace,
            self.collections.for_type(content_type)
        )
    }

    /// Builds the `find` command body
    fn build_command(query: &FindQuery) -> Value {
        let mut find = Map::new();
        find.insert("filter".to_string(), query.filter.to_query_json());

        let mut options = Map::new();
        options.insert("limit".to_string(), json!(query.limit));

        match &query.sort {
            Some(SortBy::Vector(vector)) => {
                find.insert("sort".to_string(), json!({ "$vector": vector }));
                options.insert("includeSimilarity".to_string(), json!(true));
            }
            Some(SortBy::Field { field, descending }) => {
                let direction = if *descending { -1 } else { 1 };
                find.insert("sort".to_string(), json!({ field.as_str(): direction }));
            }
            None => {}
        }

        if query.include_vector {
            find.insert("projection".to_string(), json!({ "*": 1 }));
        }

        find.insert("options".to_string(), Value::Object(options));
        json!({ "find": find })
    }
}

#[async_trait::async_trait]
impl DocumentStore for AstraStore {
    async fn find(&self, collection: ContentType, query: &FindQuery) -> AppResult<Vec<MediaItem>> {
        let start = Instant::now();
        let command = Self::build_command(query);

        tracing::debug!(
            collection = %collection,
            command = %command,
            "Astra find"
        );

        let response = self
            .http_client
            .post(self.collection_url(collection))
            .header("Token", &self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("Astra query on {} timed out", collection))
                } else {
                    AppError::HttpClient(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Astra API returned status {}: {}",
                status, body
            )));
        }

        let parsed: FindResponse = response.json().await?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Upstream(format!(
                "Astra API error: {}",
                messages.join("; ")
            )));
        }

        let documents = parsed.data.map(|d| d.documents).unwrap_or_default();
        let items: Vec<MediaItem> = documents
            .into_iter()
            .filter_map(|doc| StoredDocument::from_value(doc, collection))
            .collect();

        tracing::info!(
            collection = %collection,
            results = items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Astra query completed"
        );

        Ok(items)
    }

    fn name(&self) -> &'static str {
        "astra"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::filter::Filter;

    fn create_test_store() -> AstraStore {
        AstraStore::new(
            "https://db-id-us-east1.apps.astra.datastax.com/".to_string(),
            "AstraCS:test".to_string(),
            "default_keyspace".to_string(),
            CollectionNames::default(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_collection_url() {
        let store = create_test_store();
        assert_eq!(
            store.collection_url(ContentType::Tv),
            "https://db-id-us-east1.apps.astra.datastax.com/api/json/v1/default_keyspace/tvshows2026"
        );
    }

    #[test]
    fn test_build_command_vector_sort() {
        let query = FindQuery::new(Filter::field_in("genres", ["Horror"]), 10)
            .sorted(SortBy::Vector(vec![0.5, 0.25]));

        let command = AstraStore::build_command(&query);
        assert_eq!(
            command,
            json!({
                "find": {
                    "filter": { "genres": { "$in": ["Horror"] } },
                    "sort": { "$vector": [0.5, 0.25] },
                    "options": { "limit": 10, "includeSimilarity": true }
                }
            })
        );
    }

    #[test]
    fn test_build_command_field_sort_with_vector_projection() {
        let query = FindQuery::new(Filter::all(), 20)
            .sorted(SortBy::popularity())
            .with_vector(true);

        let command = AstraStore::build_command(&query);
        assert_eq!(command["find"]["filter"], json!({}));
        assert_eq!(command["find"]["sort"], json!({ "popularity": -1 }));
        assert_eq!(command["find"]["projection"], json!({ "*": 1 }));
        assert!(command["find"]["options"].get("includeSimilarity").is_none());
    }

    #[test]
    fn test_find_response_errors_deserialize() {
        let parsed: FindResponse = serde_json::from_str(
            r#"{ "errors": [{ "message": "Invalid filter", "errorCode": "INVALID_FILTER_EXPRESSION" }] }"#,
        )
        .unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "Invalid filter");
    }
}

use std::{sync::Arc, time::Duration};

use crate::{
    db::{DocumentStore, FindQuery},
    error::{AppError, AppResult},
    models::{ContentType, MediaItem},
};

/// Runs the same find against every target collection concurrently
///
/// Each collection query is bounded by `timeout`. A failing collection is
/// logged and contributes nothing; the call only fails when every collection
/// failed, so an outage is never reported as "no matches".
pub async fn fan_out(
    store: &Arc<dyn DocumentStore>,
    targets: &[ContentType],
    query: &FindQuery,
    timeout: Duration,
) -> AppResult<Vec<Vec<MediaItem>>> {
    let mut tasks = Vec::new();

    for &collection in targets {
        let store = Arc::clone(store);
        let query = query.clone();
        let task = tokio::spawn(async move {
            match tokio::time::timeout(timeout, store.find(collection, &query)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(format!(
                    "{} query on {} exceeded {}ms",
                    store.name(),
                    collection,
                    timeout.as_millis()
                ))),
            }
        });
        tasks.push((collection, task));
    }

    let mut results = Vec::new();
    let mut errors = Vec::new();

    for (collection, task) in tasks {
        match task.await {
            Ok(Ok(items)) => results.push(items),
            Ok(Err(e)) => {
                tracing::error!(collection = %collection, error = %e, "Collection query failed");
                errors.push(e);
            }
            Err(e) => {
                tracing::error!(collection = %collection, error = %e, "Task join error");
                errors.push(AppError::Internal(e.to_string()));
            }
        }
    }

    if !errors.is_empty() {
        tracing::warn!(
            success_count = results.len(),
            error_count = errors.len(),
            "Partial collection failure"
        );
    }

    if results.is_empty() && !errors.is_empty() {
        // Surface the first error so timeouts stay distinguishable
        return Err(errors.remove(0));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Filter, MemoryStore};
    use serde_json::json;

    /// Store whose tv collection always fails
    struct HalfBrokenStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for HalfBrokenStore {
        async fn find(
            &self,
            collection: ContentType,
            query: &FindQuery,
        ) -> AppResult<Vec<MediaItem>> {
            match collection {
                ContentType::Tv => Err(AppError::Upstream("tv collection offline".to_string())),
                ContentType::Movie => self.inner.find(collection, query).await,
            }
        }

        fn name(&self) -> &'static str {
            "half-broken"
        }
    }

    /// Store that never answers in time
    struct SlowStore;

    #[async_trait::async_trait]
    impl DocumentStore for SlowStore {
        async fn find(&self, _: ContentType, _: &FindQuery) -> AppResult<Vec<MediaItem>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_collections() {
        let store: Arc<dyn DocumentStore> = Arc::new(HalfBrokenStore {
            inner: MemoryStore::new()
                .with_documents(ContentType::Movie, vec![json!({ "_id": 1, "title": "Heat" })]),
        });

        let results = tokio_test::assert_ok!(
            fan_out(
                &store,
                &ContentType::ALL,
                &FindQuery::new(Filter::all(), 10),
                Duration::from_secs(1),
            )
            .await
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0][0].display_title(), Some("Heat"));
    }

    #[tokio::test]
    async fn test_total_failure_is_an_error() {
        let store: Arc<dyn DocumentStore> = Arc::new(HalfBrokenStore {
            inner: MemoryStore::new(),
        });

        let result = fan_out(
            &store,
            &[ContentType::Tv],
            &FindQuery::new(Filter::all(), 10),
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_slow_collection_times_out() {
        let store: Arc<dyn DocumentStore> = Arc::new(SlowStore);

        let result = fan_out(
            &store,
            &[ContentType::Movie],
            &FindQuery::new(Filter::all(), 10),
            Duration::from_millis(20),
        )
        .await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }
}

use std::sync::Arc;

use cinescope_api::{
    config::{Config, StoreBackend},
    db::{
        create_redis_client, AstraStore, CacheWriterHandle, CollectionNames, DocumentStore,
        MemoryCache, MemoryStore, RedisCache, ResultCache,
    },
    routes::{create_router, AppState},
    services::{
        AutocompleteIndex, EmbeddingService, FilterCompiler, OpenAiEmbedder, ProviderAliases,
        SearchService, SearchTimeouts, TmdbClient, UnconfiguredEmbedder,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = create_store(&config)?;
    let embedder = create_embedder(&config)?;
    let (cache, cache_writer) = create_cache(&config)?;

    let autocomplete = match &config.autocomplete_path {
        Some(path) => AutocompleteIndex::from_json_file(path)?,
        None => {
            tracing::warn!("AUTOCOMPLETE_PATH not set, autocomplete will return no results");
            AutocompleteIndex::default()
        }
    };

    let search = SearchService::new(
        store,
        embedder,
        cache,
        FilterCompiler::new(ProviderAliases::default(), config.watch_region.clone()),
        SearchTimeouts {
            store: config.store_timeout(),
            embedding: config.embedding_timeout(),
        },
    );

    let tmdb = TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_timeout(),
    )?;

    let state = Arc::new(AppState {
        search,
        autocomplete,
        tmdb,
        limits: config.limits(),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

fn create_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let collections = CollectionNames {
        movies: config.movies_collection.clone(),
        tv: config.tv_collection.clone(),
    };

    match config.store_backend {
        StoreBackend::Astra => {
            let (Some(endpoint), Some(token)) = (
                config.astra_db_api_endpoint.clone(),
                config.astra_db_application_token.clone(),
            ) else {
                anyhow::bail!("Astra credentials are not configured");
            };

            tracing::info!(endpoint = %endpoint, keyspace = %config.astra_db_keyspace, "Using Astra document store");
            Ok(Arc::new(AstraStore::new(
                endpoint,
                token,
                config.astra_db_keyspace.clone(),
                collections,
                config.store_timeout(),
            )?))
        }
        StoreBackend::Memory => {
            let Some(path) = &config.catalog_path else {
                anyhow::bail!("CATALOG_PATH is not configured");
            };

            tracing::info!(path = %path, "Using in-memory document store");
            Ok(Arc::new(MemoryStore::from_json_file(path, &collections)?))
        }
    }
}

fn create_embedder(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingService>> {
    match &config.openai_api_key {
        Some(api_key) if !api_key.is_empty() => Ok(Arc::new(OpenAiEmbedder::new(
            api_key.clone(),
            config.embedding_api_url.clone(),
            config.embedding_model.clone(),
            config.embedding_dimensions,
            config.embedding_timeout(),
        )?)),
        _ => {
            tracing::warn!("OPENAI_API_KEY not set, free-text similarity search is disabled");
            Ok(Arc::new(UnconfiguredEmbedder))
        }
    }
}

fn create_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ResultCache>, Option<CacheWriterHandle>)> {
    match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, handle) = RedisCache::new(client, config.cache_ttl_secs);
            tracing::info!("Using Redis query cache");
            Ok((Arc::new(cache), Some(handle)))
        }
        None => {
            tracing::info!(
                ttl_secs = config.cache_ttl_secs,
                max_entries = config.cache_max_entries,
                "Using in-process query cache"
            );
            Ok((
                Arc::new(MemoryCache::new(config.cache_ttl(), config.cache_max_entries)),
                None,
            ))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

use serde::Deserialize;
use std::time::Duration;

use crate::models::Limits;

/// Which document store backs the search pipeline
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Astra Data API over HTTP
    Astra,
    /// Catalog JSON file loaded into memory at startup
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Astra Data API endpoint, required for the astra backend
    pub astra_db_api_endpoint: Option<String>,

    /// Astra application token, required for the astra backend
    pub astra_db_application_token: Option<String>,

    #[serde(default = "default_keyspace")]
    pub astra_db_keyspace: String,

    /// Catalog file, required for the memory backend
    pub catalog_path: Option<String>,

    #[serde(default = "default_movies_collection")]
    pub movies_collection: String,

    #[serde(default = "default_tv_collection")]
    pub tv_collection: String,

    /// OpenAI API key used for query embeddings
    pub openai_api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_embedding_api_url")]
    pub embedding_api_url: String,

    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// TMDB API key for the metadata proxy
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Redis connection URL; when unset the query cache lives in process memory
    pub redis_url: Option<String>,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,

    #[serde(default = "default_tmdb_timeout_ms")]
    pub tmdb_timeout_ms: u64,

    /// Region key used inside `watch_providers`
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Pre-built autocomplete index served by /autocomplete
    pub autocomplete_path: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Astra
}

fn default_keyspace() -> String {
    "default_keyspace".to_string()
}

fn default_movies_collection() -> String {
    "movies2026".to_string()
}

fn default_tv_collection() -> String {
    "tvshows2026".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_api_url() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_max_entries() -> usize {
    2048
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_embedding_timeout_ms() -> u64 {
    10_000
}

fn default_tmdb_timeout_ms() -> u64 {
    10_000
}

fn default_watch_region() -> String {
    "US".to_string()
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the selected backend has what it needs to start
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.store_backend {
            StoreBackend::Astra => {
                if self.astra_db_api_endpoint.is_none() || self.astra_db_application_token.is_none()
                {
                    anyhow::bail!(
                        "ASTRA_DB_API_ENDPOINT and ASTRA_DB_APPLICATION_TOKEN are required for the astra backend"
                    );
                }
            }
            StoreBackend::Memory => {
                if self.catalog_path.is_none() {
                    anyhow::bail!("CATALOG_PATH is required for the memory backend");
                }
            }
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            anyhow::bail!("DEFAULT_LIMIT must be between 1 and MAX_LIMIT");
        }

        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }

    pub fn tmdb_timeout(&self) -> Duration {
        Duration::from_millis(self.tmdb_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: Vec<(&str, &str)>) -> Config {
        envy::from_iter(
            vars.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(vec![("CATALOG_PATH", "catalog.json")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.store_backend, StoreBackend::Astra);
        assert_eq!(config.movies_collection, "movies2026");
        assert_eq!(config.tv_collection, "tvshows2026");
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.watch_region, "US");
        assert_eq!(config.limits().max_limit, 100);
        assert_eq!(config.tmdb_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_astra_backend_requires_credentials() {
        let config = config_from(vec![]);
        assert!(config.validate().is_err());

        let config = config_from(vec![
            ("ASTRA_DB_API_ENDPOINT", "https://db.example"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_requires_catalog() {
        let config = config_from(vec![("STORE_BACKEND", "memory")]);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.validate().is_err());

        let config = config_from(vec![
            ("STORE_BACKEND", "memory"),
            ("CATALOG_PATH", "catalog.json"),
        ]);
        assert!(config.validate().is_ok());
    }
}

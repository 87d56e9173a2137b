use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;

use crate::db::cache::{CacheKey, ResultCache};
use crate::error::AppResult;
use crate::models::MediaItem;

const KEY_PREFIX: &str = "query:";

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Query cache shared across instances through Redis
///
/// Reads go straight to Redis; writes are queued to a background task so a
/// slow Redis never holds up a response. Expiry is Redis' own `SET EX`.
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
    ttl_secs: u64,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl RedisCache {
    /// Creates a new cache and spawns its background writer
    pub fn new(redis_client: Client, ttl_secs: u64) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
            ttl_secs,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    fn redis_key(key: &CacheKey) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown signal, flushes all remaining messages before exiting.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    write_rx.close();
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    async fn read_from_redis(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }
}

#[async_trait::async_trait]
impl ResultCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<MediaItem>> {
        let redis_key = Self::redis_key(key);

        let json = match self.read_from_redis(&redis_key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, key = %redis_key, "Redis read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(items) => {
                tracing::debug!(key = %redis_key, "Query cache hit");
                Some(items)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %redis_key, "Cache deserialization error");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, value: &[MediaItem]) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: Self::redis_key(key),
            value: json,
            ttl: self.ttl_secs,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

pub mod astra;
pub mod cache;
pub mod document;
pub mod filter;
pub mod memory;
pub mod redis;
pub mod store;
pub mod vector;

pub use astra::{AstraStore, CollectionNames};
pub use cache::{CacheKey, Clock, MemoryCache, ResultCache, SystemClock};
pub use document::StoredDocument;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use redis::{create_redis_client, CacheWriterHandle, RedisCache};
pub use store::{DocumentStore, FindQuery, SortBy};
pub use vector::{normalize_vector, NormalizedVector};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::{collections::HashMap, fmt::Display, sync::Arc, time::Duration};

use crate::models::{ContentType, MediaItem, PaymentType};

/// Key for the two cacheable request shapes
///
/// Values are stored sorted and deduplicated so that selection order never
/// produces distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Genre-only browse
    GenreBrowse {
        genres: Vec<String>,
        content_types: Vec<ContentType>,
        payment_types: Vec<PaymentType>,
        limit: usize,
    },
    /// Unfiltered browse
    Discover {
        content_types: Vec<ContentType>,
        payment_types: Vec<PaymentType>,
        limit: usize,
    },
}

impl CacheKey {
    pub fn genre_browse(
        genres: &[String],
        content_types: &[ContentType],
        payment_types: &[PaymentType],
        limit: usize,
    ) -> Self {
        let mut genres = genres.to_vec();
        genres.sort();
        genres.dedup();
        CacheKey::GenreBrowse {
            genres,
            content_types: sorted(content_types),
            payment_types: sorted(payment_types),
            limit,
        }
    }

    pub fn discover(
        content_types: &[ContentType],
        payment_types: &[PaymentType],
        limit: usize,
    ) -> Self {
        CacheKey::Discover {
            content_types: sorted(content_types),
            payment_types: sorted(payment_types),
            limit,
        }
    }
}

fn sorted<T: Ord + Clone>(values: &[T]) -> Vec<T> {
    let mut values = values.to_vec();
    values.sort();
    values.dedup();
    values
}

fn join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::GenreBrowse {
                genres,
                content_types,
                payment_types,
                limit,
            } => write!(
                f,
                "genre:{}|types:{}|pay:{}|limit:{}",
                join(genres),
                join(content_types),
                join(payment_types),
                limit
            ),
            CacheKey::Discover {
                content_types,
                payment_types,
                limit,
            } => write!(
                f,
                "discover|types:{}|pay:{}|limit:{}",
                join(content_types),
                join(payment_types),
                limit
            ),
        }
    }
}

/// Source of wall-clock time for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Process-wide store of ranked result lists
///
/// Failures inside an implementation are logged and reported as misses; a
/// broken cache never fails a request.
#[async_trait::async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Vec<MediaItem>>;

    async fn put(&self, key: &CacheKey, value: &[MediaItem]);
}

struct CacheEntry {
    timestamp: DateTime<Utc>,
    data: Vec<MediaItem>,
}

/// In-process TTL cache with a cap on the number of keys
///
/// When full, expired entries are dropped first, then the oldest one.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: chrono::Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            max_entries: max_entries.max(1),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.timestamp < self.ttl
    }

    fn make_room(&self, entries: &mut HashMap<String, CacheEntry>, now: DateTime<Utc>) {
        if entries.len() < self.max_entries {
            return;
        }

        entries.retain(|_, entry| self.is_fresh(entry, now));

        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.timestamp)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait::async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<MediaItem>> {
        let key = key.to_string();
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if self.is_fresh(entry, now) => {
                tracing::debug!(key = %key, "Query cache hit");
                Some(entry.data.clone())
            }
            Some(_) => {
                tracing::debug!(key = %key, "Query cache entry expired");
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &CacheKey, value: &[MediaItem]) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let key = key.to_string();

        if !entries.contains_key(&key) {
            self.make_room(&mut entries, now);
        }

        entries.insert(
            key,
            CacheEntry {
                timestamp: now,
                data: value.to_vec(),
            },
        );
    }
}

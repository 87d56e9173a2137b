/// Returns a cached result list or computes, stores and returns it.
///
/// # Arguments
/// * `$cache`: a [`ResultCache`](crate::db::ResultCache).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$block`: a future yielding `AppResult<Vec<MediaItem>>`, awaited on a miss.
///
/// Evaluates to `AppResult<Vec<MediaItem>>`; errors from `$block` are
/// propagated and never cached.
///
/// # Example
/// ```rust,ignore
/// let results = cached!(self.cache, key, async {
///     self.filtered_listing(&request).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        match $cache.get(&$key).await {
            Some(cached) => Ok(cached),
            None => match $block.await {
                Ok(value) => {
                    $cache.put(&$key, &value).await;
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}

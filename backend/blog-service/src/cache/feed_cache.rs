use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::metrics::FEED_CACHE_EVENTS;

/// Rendered global-feed cache backed by Redis.
///
/// Stores the serialized response body of the global feed for a fixed window
/// (20 seconds by default), one key per page number. Within the window every
/// request for that page returns the cached bytes unchanged; `clear` removes
/// every cached page at once.
///
/// The observed predecessor kept a single key for all pages, so deep links
/// served page-1 content during the window. Keys here incorporate the page
/// number instead; see DESIGN.md.
#[derive(Clone)]
pub struct FeedCache {
    redis: ConnectionManager,
    ttl: Duration,
}

const KEY_PREFIX: &str = "index:v1";

impl FeedCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn page_key(page: i64) -> String {
        format!("{}:{}", KEY_PREFIX, page)
    }

    /// Fetch the cached body for a page, if present and unexpired.
    ///
    /// Read failures count as misses: the caller recomputes the page rather
    /// than failing the request.
    pub async fn get_page(&self, page: i64) -> Option<String> {
        let key = Self::page_key(page);
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(body)) => {
                debug!("feed cache HIT for page {}", page);
                FEED_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                Some(body)
            }
            Ok(None) => {
                debug!("feed cache MISS for page {}", page);
                FEED_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                None
            }
            Err(e) => {
                warn!("redis read error for feed cache: {}", e);
                FEED_CACHE_EVENTS.with_label_values(&["error"]).inc();
                None
            }
        }
    }

    /// Store the rendered body for a page with the configured TTL.
    ///
    /// Concurrent writers within one window compute the same value, so
    /// last-writer-wins is acceptable. Write failures are logged and
    /// swallowed; the response is served either way.
    pub async fn set_page(&self, page: i64, body: &str) {
        let key = Self::page_key(page);
        let mut conn = self.redis.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, body, self.ttl.as_secs())
            .await
        {
            warn!("failed to write feed cache for page {}: {}", page, e);
            FEED_CACHE_EVENTS.with_label_values(&["error"]).inc();
        } else {
            debug!("feed cache WRITE for page {} with TTL {:?}", page, self.ttl);
        }
    }

    /// Remove every cached feed page.
    ///
    /// Uses SCAN instead of KEYS to avoid blocking Redis.
    pub async fn clear(&self) -> Result<u64> {
        let pattern = format!("{}:*", KEY_PREFIX);
        let mut conn = self.redis.clone();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| AppError::Cache(e.to_string()))?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(|e| AppError::Cache(e.to_string()))?;
                total_deleted += keys.len() as u64;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!("feed cache CLEAR removed {} keys", total_deleted);
        Ok(total_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_format() {
        assert_eq!(FeedCache::page_key(1), "index:v1:1");
        assert_eq!(FeedCache::page_key(3), "index:v1:3");
    }

    #[test]
    fn test_keys_distinguish_pages() {
        assert_ne!(FeedCache::page_key(1), FeedCache::page_key(2));
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::{Cache, CacheKey},
    error::PosterError,
    services::providers::PosterSource,
};

/// Image shown when a movie's poster cannot be resolved
pub const PLACEHOLDER_POSTER_URL: &str =
    "https://via.placeholder.com/500x750?text=No+Poster+Available";

const POSTER_CACHE_TTL: u64 = 604800; // 1 week
const DEFAULT_CACHE_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Resolves movie ids to poster URLs, falling back to a placeholder
///
/// Only successful lookups are cached. A cache read that fails or exceeds
/// the cache timeout is treated as a miss and falls through to a live lookup.
#[derive(Clone)]
pub struct PosterResolver {
    source: Arc<dyn PosterSource>,
    cache: Option<Cache>,
    cache_timeout: Duration,
}

impl PosterResolver {
    pub fn new(source: Arc<dyn PosterSource>, cache: Option<Cache>) -> Self {
        Self {
            source,
            cache,
            cache_timeout: DEFAULT_CACHE_READ_TIMEOUT,
        }
    }

    /// Overrides the deadline for a single cache read
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    /// Looks up a poster URL, keeping the failure reason
    pub async fn lookup(&self, movie_id: i64) -> Result<String, PosterError> {
        let key = CacheKey::Poster(movie_id);

        if let Some(cache) = &self.cache {
            let read = cache.get_from_cache::<String>(&key);
            match tokio::time::timeout(self.cache_timeout, read).await {
                Ok(Ok(Some(url))) => return Ok(url),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, movie_id, "Poster cache read failed");
                }
                Err(_) => {
                    tracing::warn!(
                        movie_id,
                        timeout_ms = self.cache_timeout.as_millis() as u64,
                        "Poster cache read timed out"
                    );
                }
            }
        }

        let url = self.source.fetch_poster_url(movie_id).await?;

        if let Some(cache) = &self.cache {
            cache.set_in_background(&key, &url, POSTER_CACHE_TTL);
        }

        Ok(url)
    }

    /// Returns the poster URL for `movie_id`, or the placeholder on any failure
    pub async fn resolve(&self, movie_id: i64) -> String {
        match self.lookup(movie_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    movie_id,
                    provider = self.source.name(),
                    "Poster unavailable, using placeholder"
                );
                PLACEHOLDER_POSTER_URL.to_string()
            }
        }
    }

    /// Resolves several posters concurrently, preserving input order
    pub async fn resolve_many(&self, movie_ids: &[i64]) -> Vec<String> {
        let tasks: Vec<_> = movie_ids
            .iter()
            .map(|&movie_id| {
                let resolver = self.clone();
                tokio::spawn(async move { resolver.resolve(movie_id).await })
            })
            .collect();

        let mut urls = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::error!(error = %e, "Poster task join error");
                    urls.push(PLACEHOLDER_POSTER_URL.to_string());
                }
            }
        }

        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;
    use crate::services::providers::{MockPosterSource, TmdbPosterSource};
    use mockall::predicate::eq;

    fn resolver(source: MockPosterSource) -> PosterResolver {
        PosterResolver::new(Arc::new(source), None)
    }

    #[tokio::test]
    async fn test_resolve_returns_source_url() {
        let mut source = MockPosterSource::new();
        source
            .expect_fetch_poster_url()
            .with(eq(19995))
            .times(1)
            .returning(|_| Ok("https://image.tmdb.org/t/p/w500/avatar.jpg".to_string()));

        let url = resolver(source).resolve(19995).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/avatar.jpg");
    }

    #[tokio::test]
    async fn test_resolve_missing_poster_uses_placeholder() {
        let mut source = MockPosterSource::new();
        source
            .expect_fetch_poster_url()
            .returning(|id| Err(PosterError::MissingPosterPath(id)));
        source.expect_name().return_const("mock");

        assert_eq!(resolver(source).resolve(7).await, PLACEHOLDER_POSTER_URL);
    }

    #[test]
    fn test_lookup_keeps_failure_reason() {
        let mut source = MockPosterSource::new();
        source
            .expect_fetch_poster_url()
            .returning(|_| Err(PosterError::Malformed("expected value".to_string())));

        let err = tokio_test::block_on(resolver(source).lookup(7)).unwrap_err();
        assert!(matches!(err, PosterError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_resolve_network_failure_uses_placeholder() {
        let source = TmdbPosterSource::new(
            "test_key".to_string(),
            "http://127.0.0.1:9".to_string(),
            "https://image.tmdb.org".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        let resolver = PosterResolver::new(Arc::new(source), None);

        assert_eq!(resolver.resolve(19995).await, PLACEHOLDER_POSTER_URL);
    }

    #[tokio::test]
    async fn test_resolve_many_preserves_order() {
        let mut source = MockPosterSource::new();
        source.expect_fetch_poster_url().returning(|id| {
            if id == 2 {
                Err(PosterError::MissingPosterPath(id))
            } else {
                Ok(format!("https://img/{id}.jpg"))
            }
        });
        source.expect_name().return_const("mock");

        let urls = resolver(source).resolve_many(&[3, 2, 1]).await;
        assert_eq!(
            urls,
            vec![
                "https://img/3.jpg".to_string(),
                PLACEHOLDER_POSTER_URL.to_string(),
                "https://img/1.jpg".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_many_empty() {
        let source = MockPosterSource::new();
        assert!(resolver(source).resolve_many(&[]).await.is_empty());
    }

    fn source_returning(url: &'static str) -> MockPosterSource {
        let mut source = MockPosterSource::new();
        source
            .expect_fetch_poster_url()
            .times(1)
            .returning(move |_| Ok(url.to_string()));
        source.expect_name().return_const("mock");
        source
    }

    #[tokio::test]
    async fn test_resolve_unreachable_cache_falls_back_to_source() {
        // Nothing listens on port 1, so every cache read errors out
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client);
        let resolver = PosterResolver::new(
            Arc::new(source_returning("https://img/live.jpg")),
            Some(cache),
        );

        assert_eq!(resolver.resolve(42).await, "https://img/live.jpg");
    }

    #[tokio::test]
    async fn test_resolve_unresponsive_cache_is_bounded() {
        // The socket accepts connections into its backlog but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let redis_url = format!("redis://{}", listener.local_addr().unwrap());
        let (cache, _handle) = Cache::new(create_redis_client(&redis_url).unwrap());

        let resolver = PosterResolver::new(
            Arc::new(source_returning("https://img/live.jpg")),
            Some(cache),
        )
        .with_cache_timeout(Duration::from_millis(100));

        let url = tokio::time::timeout(Duration::from_secs(5), resolver.resolve(42))
            .await
            .expect("cache read should give up well before the outer deadline");
        assert_eq!(url, "https://img/live.jpg");

        drop(listener);
    }
}

//! Poster metadata providers
//!
//! The resolver talks to a `PosterSource` rather than to TMDB directly so the
//! upstream can be swapped out (or mocked) without touching the fallback
//! policy.

use crate::error::PosterError;

pub mod tmdb;

pub use tmdb::TmdbPosterSource;

/// Looks up the display image URL for a movie
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterSource: Send + Sync {
    /// Fetches the poster URL for `movie_id`
    ///
    /// Returns an error for any upstream failure, including a movie that has
    /// no poster.
    async fn fetch_poster_url(&self, movie_id: i64) -> Result<String, PosterError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

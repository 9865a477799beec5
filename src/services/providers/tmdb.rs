//! TMDB poster provider
//!
//! API Flow:
//! 1. Details: GET /3/movie/{movie_id}?api_key=..&language=en-US → optional `poster_path`
//! 2. Image:   {image_url}/t/p/w500/{poster_path}

use crate::{error::PosterError, models::TmdbMovieDetails, services::providers::PosterSource};
use reqwest::Client as HttpClient;
use std::time::Duration;

const POSTER_SIZE: &str = "w500";
const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbPosterSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
}

impl TmdbPosterSource {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        image_url: String,
        timeout: Duration,
    ) -> Result<Self, PosterError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the full image URL; TMDB poster paths start with a slash
    fn image_url_for(&self, poster_path: &str) -> String {
        format!(
            "{}/t/p/{}/{}",
            self.image_url,
            POSTER_SIZE,
            poster_path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl PosterSource for TmdbPosterSource {
    async fn fetch_poster_url(&self, movie_id: i64) -> Result<String, PosterError> {
        let url = format!("{}/3/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PosterError::Status(response.status()));
        }

        let response_text = response.text().await?;
        let details: TmdbMovieDetails = serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                error = %e,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            PosterError::Malformed(e.to_string())
        })?;

        let poster_url = details
            .poster_path
            .filter(|path| !path.trim().is_empty())
            .map(|path| self.image_url_for(&path))
            .ok_or(PosterError::MissingPosterPath(movie_id))?;

        tracing::debug!(movie_id, provider = "tmdb", "Poster resolved");

        Ok(poster_url)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

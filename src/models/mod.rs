use serde::{Deserialize, Serialize};

/// A movie in the loaded catalog
///
/// `row_index` is the movie's position in the catalog artifact, which is also
/// its row (and column) in the similarity matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub row_index: usize,
}

/// A single similar-movie result produced by the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub movie_id: i64,
    /// Similarity to the queried movie, rounded to 3 decimal places
    pub similarity_score: f64,
}

/// A recommendation enriched with its resolved poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub title: String,
    pub movie_id: i64,
    pub similarity_score: f64,
    pub poster_url: String,
}

impl RecommendedMovie {
    pub fn new(recommendation: Recommendation, poster_url: String) -> Self {
        Self {
            title: recommendation.title,
            movie_id: recommendation.movie_id,
            similarity_score: recommendation.similarity_score,
            poster_url,
        }
    }
}

/// Lightweight projection of a movie returned by listing endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub movie_id: i64,
    pub title: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `GET /3/movie/{id}` response that we read
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

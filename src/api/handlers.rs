use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{MovieSummary, RecommendedMovie};
use crate::services::{discovery, recommend, title_search};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_movies: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub movie_id: i64,
    pub title: String,
    pub poster_url: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub recommendations: Vec<RecommendedMovie>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Catalog size and load time
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_movies: state.store.catalog().len(),
        loaded_at: state.store.loaded_at(),
    })
}

/// All movies in catalog order
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state
        .store
        .catalog()
        .movies()
        .iter()
        .map(MovieSummary::from)
        .collect();
    Json(movies)
}

pub async fn search_movies(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let Query(params) = query?;
    let query = params.q.unwrap_or_default();
    let titles = title_search::search_titles(state.store.catalog(), &query)?;
    Ok(Json(titles))
}

pub async fn random_movies(
    State(state): State<AppState>,
    query: Result<Query<RandomQuery>, QueryRejection>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let Query(params) = query?;
    let mut rng = rand::thread_rng();
    let movies = discovery::random_movies(state.store.catalog(), params.count, &mut rng)?;
    Ok(Json(movies))
}

/// A single movie with its poster
pub async fn get_movie(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MovieDetailResponse>> {
    let Path(movie_id) = path?;
    let movie = state
        .store
        .catalog()
        .find_by_id(movie_id)
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;

    let poster_url = state.posters.resolve(movie.id).await;

    Ok(Json(MovieDetailResponse {
        movie_id: movie.id,
        title: movie.title.clone(),
        poster_url,
    }))
}

/// Movies similar to `title`, each with its poster
///
/// An unknown title is not an error: the response simply has no
/// recommendations.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) = query?;
    let title = params.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }

    let recommendations = recommend(&title, state.store.catalog(), state.store.matrix());

    tracing::info!(
        request_id = %request_id,
        title = %title,
        results = recommendations.len(),
        "Recommendations computed"
    );

    let movie_ids: Vec<i64> = recommendations.iter().map(|r| r.movie_id).collect();
    let posters = state.posters.resolve_many(&movie_ids).await;

    let recommendations = recommendations
        .into_iter()
        .zip(posters)
        .map(|(recommendation, poster_url)| RecommendedMovie::new(recommendation, poster_url))
        .collect();

    Ok(Json(RecommendationResponse {
        title,
        recommendations,
    }))
}

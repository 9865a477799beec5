use crate::{
    db::{Catalog, SimilarityMatrix},
    models::Recommendation,
};

/// Number of similar movies returned per query
pub const RECOMMENDATION_COUNT: usize = 5;

/// Finds the movies most similar to `title`
///
/// Ranks every other catalog row by its score in the queried movie's matrix
/// row, highest first. Equal scores keep catalog order. The queried movie is
/// excluded by its row index, so a neighbour scoring as high as the movie
/// itself is still returned.
///
/// Returns an empty list when the title is unknown or the matrix row does not
/// line up with the catalog.
pub fn recommend(title: &str, catalog: &Catalog, matrix: &SimilarityMatrix) -> Vec<Recommendation> {
    let Some(movie) = catalog.find_by_title(title) else {
        tracing::debug!(title = %title, "Title not in catalog");
        return Vec::new();
    };

    let Some(scores) = matrix.row(movie.row_index) else {
        tracing::warn!(
            title = %title,
            row_index = movie.row_index,
            "No similarity row for catalog entry"
        );
        return Vec::new();
    };

    if scores.len() != catalog.len() {
        tracing::warn!(
            row_len = scores.len(),
            movies = catalog.len(),
            "Similarity row length does not match catalog"
        );
        return Vec::new();
    }

    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    // Stable, so ties stay in row order. Scores are finite (checked on load).
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .filter(|(row_index, _)| *row_index != movie.row_index)
        .take(RECOMMENDATION_COUNT)
        .filter_map(|(row_index, score)| {
            catalog.get(row_index).map(|other| Recommendation {
                title: other.title.clone(),
                movie_id: other.id,
                similarity_score: round_score(score),
            })
        })
        .collect()
}

/// Rounds to 3 decimal places
fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

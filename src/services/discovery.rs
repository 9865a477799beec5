use rand::Rng;

use crate::{
    db::Catalog,
    error::{AppError, AppResult},
    models::MovieSummary,
};

pub const DEFAULT_RANDOM_COUNT: usize = 6;
pub const MAX_RANDOM_COUNT: usize = 50;

/// Picks a random selection of distinct movies for browsing
///
/// `count` defaults to [`DEFAULT_RANDOM_COUNT`] and must be between 1 and
/// [`MAX_RANDOM_COUNT`]; fewer are returned when the catalog is smaller.
pub fn random_movies<R: Rng + ?Sized>(
    catalog: &Catalog,
    count: Option<usize>,
    rng: &mut R,
) -> AppResult<Vec<MovieSummary>> {
    let count = count.unwrap_or(DEFAULT_RANDOM_COUNT);
    if count == 0 || count > MAX_RANDOM_COUNT {
        return Err(AppError::InvalidInput(format!(
            "count must be between 1 and {}",
            MAX_RANDOM_COUNT
        )));
    }

    Ok(catalog
        .sample(count, rng)
        .into_iter()
        .map(MovieSummary::from)
        .collect())
}

use crate::{
    db::Catalog,
    error::{AppError, AppResult},
    models::MovieSummary,
};

/// Case-insensitive title search over the loaded catalog
///
/// Matches are returned in catalog order. A blank query is rejected rather
/// than matching everything.
pub fn search_titles(catalog: &Catalog, query: &str) -> AppResult<Vec<MovieSummary>> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let titles: Vec<MovieSummary> = catalog
        .search(query)
        .into_iter()
        .map(MovieSummary::from)
        .collect();

    tracing::info!(query = %query, results = titles.len(), "Title search completed");

    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new([
            (155, "The Dark Knight"),
            (272, "Batman Begins"),
            (49026, "The Dark Knight Rises"),
        ])
    }

    #[test]
    fn test_search_titles_matches_substring() {
        let titles = search_titles(&catalog(), "dark knight").unwrap();
        let ids: Vec<i64> = titles.iter().map(|t| t.movie_id).collect();
        assert_eq!(ids, vec![155, 49026]);
    }

    #[test]
    fn test_search_titles_no_matches() {
        assert!(search_titles(&catalog(), "Inception").unwrap().is_empty());
    }

    #[test]
    fn test_search_titles_rejects_blank_query() {
        let err = search_titles(&catalog(), "  ").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}

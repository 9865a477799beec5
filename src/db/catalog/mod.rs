use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::models::Movie;

mod loader;

/// Errors raised while loading the catalog and similarity artifacts
///
/// All of these are fatal: the server refuses to start without a consistent
/// catalog and matrix.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Malformed catalog {}: {reason}", path.display())]
    MalformedCatalog { path: PathBuf, reason: String },

    #[error("Catalog contains no movies")]
    EmptyCatalog,

    #[error("Similarity matrix is not square: row {row} has {len} columns, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Similarity matrix has {rows} rows but the catalog has {movies} movies")]
    DimensionMismatch { rows: usize, movies: usize },

    #[error("Similarity matrix entry ({row}, {col}) is not a finite number")]
    NonFiniteScore { row: usize, col: usize },
}

/// Ordered table of movies; a movie's position is its matrix row
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Builds a catalog from `(movie_id, title)` pairs in row order
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let movies = entries
            .into_iter()
            .enumerate()
            .map(|(row_index, (id, title))| Movie {
                id,
                title: title.into(),
                row_index,
            })
            .collect();

        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, row_index: usize) -> Option<&Movie> {
        self.movies.get(row_index)
    }

    /// First movie whose title equals `title` exactly
    pub fn find_by_title(&self, title: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.title == title)
    }

    pub fn find_by_id(&self, movie_id: i64) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == movie_id)
    }

    /// Case-insensitive substring search over titles, in catalog order
    ///
    /// The query is matched as given, surrounding whitespace included. A
    /// whitespace-only query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Movie> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        self.movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Picks up to `count` distinct movies uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&Movie> {
        self.movies.choose_multiple(rng, count).collect()
    }
}

/// Dense square matrix of precomputed pairwise similarities, stored row-major
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Validates that `rows` is square and every entry is finite
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LoadError> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dimension {
                return Err(LoadError::NotSquare {
                    row,
                    len: values.len(),
                    expected: dimension,
                });
            }
            if let Some(col) = values.iter().position(|score| !score.is_finite()) {
                return Err(LoadError::NonFiniteScore { row, col });
            }
            scores.extend(values);
        }

        Ok(Self { dimension, scores })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.dimension {
            return None;
        }
        let start = index * self.dimension;
        self.scores.get(start..start + self.dimension)
    }
}

/// The catalog and its similarity matrix, loaded once and never mutated
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog: Catalog,
    matrix: SimilarityMatrix,
    loaded_at: DateTime<Utc>,
}

impl CatalogStore {
    /// Pairs a catalog with its matrix, checking that their dimensions agree
    pub fn new(catalog: Catalog, matrix: SimilarityMatrix) -> Result<Self, LoadError> {
        if catalog.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }
        if matrix.dimension() != catalog.len() {
            return Err(LoadError::DimensionMismatch {
                rows: matrix.dimension(),
                movies: catalog.len(),
            });
        }

        Ok(Self {
            catalog,
            matrix,
            loaded_at: Utc::now(),
        })
    }

    /// Reads both artifacts from disk
    ///
    /// The catalog may be a JSON record array, a JSON column table, or a CSV
    /// file (chosen by the `.csv` extension). The matrix is a JSON 2-D array.
    pub fn load(catalog_path: &Path, similarity_path: &Path) -> Result<Self, LoadError> {
        let catalog = loader::read_catalog(catalog_path)?;
        let matrix = loader::read_matrix(similarity_path)?;
        let store = Self::new(catalog, matrix)?;

        tracing::info!(
            movies = store.catalog.len(),
            catalog = %catalog_path.display(),
            similarity = %similarity_path.display(),
            "Loaded movie catalog and similarity matrix"
        );

        Ok(store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

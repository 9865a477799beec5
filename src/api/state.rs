use std::sync::Arc;

use crate::db::CatalogStore;
use crate::services::PosterResolver;

/// Shared application state
///
/// The catalog is immutable after startup, so handlers share it through an
/// `Arc` without locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub posters: PosterResolver,
}

impl AppState {
    pub fn new(store: CatalogStore, posters: PosterResolver) -> Self {
        Self {
            store: Arc::new(store),
            posters,
        }
    }
}

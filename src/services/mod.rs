pub mod discovery;
pub mod posters;
pub mod providers;
pub mod recommendations;
pub mod title_search;

pub use posters::{PosterResolver, PLACEHOLDER_POSTER_URL};
pub use providers::{PosterSource, TmdbPosterSource};
pub use recommendations::recommend;

pub mod catalog;
pub mod redis;

pub use catalog::{Catalog, CatalogStore, LoadError, SimilarityMatrix};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};

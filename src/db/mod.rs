//! Persistence seams for the host.
//!
//! The scoring core only ever sees plain slices; these traits are how the
//! HTTP layer fetches those slices and writes derived data back.

use crate::error::AppResult;
use crate::models::{Event, NormalizedMovie, Review, UserProfile};

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::{create_redis_client, RedisStore, StoreKey};

#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Whole catalog, ordered by movie id
    async fn get_all_movies(&self) -> AppResult<Vec<NormalizedMovie>>;

    async fn get_movie(&self, id: &str) -> AppResult<Option<NormalizedMovie>>;

    /// Inserts or replaces movies keyed by id
    async fn upsert_movies(&self, movies: Vec<NormalizedMovie>) -> AppResult<()>;
}

#[async_trait::async_trait]
pub trait EventRepository: Send + Sync {
    async fn append(&self, event: Event) -> AppResult<()>;

    /// Up to `limit` most recent events, oldest first
    async fn recent(&self, limit: usize) -> AppResult<Vec<Event>>;
}

#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn add_review(&self, review: Review) -> AppResult<()>;

    async fn reviews(&self) -> AppResult<Vec<Review>>;

    /// Stored profile blob; an empty profile when nothing was saved yet
    async fn load_profile(&self) -> AppResult<UserProfile>;

    async fn save_profile(&self, profile: &UserProfile) -> AppResult<()>;
}

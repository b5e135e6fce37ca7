use redis::AsyncCommands;
use redis::Client;
use std::collections::HashMap;
use std::fmt::Display;

use crate::db::{CatalogRepository, EventRepository, ProfileRepository};
use crate::error::{AppError, AppResult};
use crate::models::{Event, NormalizedMovie, Review, UserProfile};
use crate::services::trends::EVENT_LOG_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Catalog,
    Events,
    Reviews,
    Profile,
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::Catalog => write!(f, "cinemood:catalog"),
            StoreKey::Events => write!(f, "cinemood:events"),
            StoreKey::Reviews => write!(f, "cinemood:reviews"),
            StoreKey::Profile => write!(f, "cinemood:profile"),
        }
    }
}

/// Creates a Redis client for the persistent store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Store serialization error: {}", e)))
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> AppResult<T> {
    serde_json::from_str(json)
        .map_err(|e| AppError::Internal(format!("Store deserialization error: {}", e)))
}

/// Redis-backed store
///
/// Catalog entries live in one hash keyed by movie id, events in a list
/// capped at the event log capacity (newest at the head), reviews in an
/// append-only list and the profile as a single JSON string.
#[derive(Clone)]
pub struct RedisStore {
    redis_client: Client,
}

impl RedisStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        Ok(self.redis_client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait::async_trait]
impl CatalogRepository for RedisStore {
    async fn get_all_movies(&self) -> AppResult<Vec<NormalizedMovie>> {
        let mut conn = self.connection().await?;
        let raw: HashMap<String, String> = conn.hgetall(StoreKey::Catalog.to_string()).await?;

        let mut movies = raw
            .values()
            .map(|json| from_json::<NormalizedMovie>(json))
            .collect::<AppResult<Vec<_>>>()?;
        movies.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(movies)
    }

    async fn get_movie(&self, id: &str) -> AppResult<Option<NormalizedMovie>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.hget(StoreKey::Catalog.to_string(), id).await?;
        raw.as_deref().map(from_json).transpose()
    }

    async fn upsert_movies(&self, movies: Vec<NormalizedMovie>) -> AppResult<()> {
        if movies.is_empty() {
            return Ok(());
        }

        let entries = movies
            .iter()
            .map(|m| Ok((m.id.clone(), to_json(m)?)))
            .collect::<AppResult<Vec<(String, String)>>>()?;

        let mut conn = self.connection().await?;
        let _: () = conn
            .hset_multiple(StoreKey::Catalog.to_string(), &entries)
            .await?;
        tracing::debug!(count = entries.len(), "Upserted movies into Redis catalog");
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventRepository for RedisStore {
    async fn append(&self, event: Event) -> AppResult<()> {
        let json = to_json(&event)?;
        let key = StoreKey::Events.to_string();

        let mut conn = self.connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, json)
            .ignore()
            .ltrim(&key, 0, EVENT_LOG_CAPACITY as isize - 1)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<Event>> {
        let limit = limit.min(EVENT_LOG_CAPACITY);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.connection().await?;
        let raw: Vec<String> = conn
            .lrange(StoreKey::Events.to_string(), 0, limit as isize - 1)
            .await?;

        // List head is the newest event
        raw.iter().rev().map(|json| from_json(json)).collect()
    }
}

#[async_trait::async_trait]
impl ProfileRepository for RedisStore {
    async fn add_review(&self, review: Review) -> AppResult<()> {
        let json = to_json(&review)?;
        let mut conn = self.connection().await?;
        let _: () = conn.rpush(StoreKey::Reviews.to_string(), json).await?;
        Ok(())
    }

    async fn reviews(&self) -> AppResult<Vec<Review>> {
        let mut conn = self.connection().await?;
        let raw: Vec<String> = conn.lrange(StoreKey::Reviews.to_string(), 0, -1).await?;
        raw.iter().map(|json| from_json(json)).collect()
    }

    async fn load_profile(&self) -> AppResult<UserProfile> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(StoreKey::Profile.to_string()).await?;
        match raw {
            Some(json) => from_json(&json),
            None => Ok(UserProfile::default()),
        }
    }

    async fn save_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let json = to_json(profile)?;
        let mut conn = self.connection().await?;
        let _: () = conn.set(StoreKey::Profile.to_string(), json).await?;
        Ok(())
    }
}

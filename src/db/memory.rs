use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::{CatalogRepository, EventRepository, ProfileRepository};
use crate::error::AppResult;
use crate::models::{Event, NormalizedMovie, Review, UserProfile};
use crate::services::trends::EventLog;

/// Process-local store used when no Redis URL is configured
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    movies: BTreeMap<String, NormalizedMovie>,
    events: EventLog,
    reviews: Vec<Review>,
    profile: UserProfile,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogRepository for MemoryStore {
    async fn get_all_movies(&self) -> AppResult<Vec<NormalizedMovie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.values().cloned().collect())
    }

    async fn get_movie(&self, id: &str) -> AppResult<Option<NormalizedMovie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.get(id).cloned())
    }

    async fn upsert_movies(&self, movies: Vec<NormalizedMovie>) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        for movie in movies {
            inner.movies.insert(movie.id.clone(), movie);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventRepository for MemoryStore {
    async fn append(&self, event: Event) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.events.push(event);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let events = inner.events.events();
        let skip = events.len().saturating_sub(limit);
        Ok(events.into_iter().skip(skip).collect())
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MemoryStore {
    async fn add_review(&self, review: Review) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.reviews.push(review);
        Ok(())
    }

    async fn reviews(&self) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.clone())
    }

    async fn load_profile(&self) -> AppResult<UserProfile> {
        let inner = self.inner.read().await;
        Ok(inner.profile.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.profile = profile.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchetypeRef, EventType, Metrics};
    use crate::services::trends::{new_event, EVENT_LOG_CAPACITY};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn movie(id: &str) -> NormalizedMovie {
        NormalizedMovie {
            id: id.to_string(),
            title: id.to_string(),
            year: None,
            genres: vec![],
            runtime_minutes: 90,
            rating_out_of10: 5.0,
            metrics: Metrics::neutral(),
            region_tags: BTreeSet::new(),
            director: None,
            votes: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store
            .upsert_movies(vec![movie("b"), movie("a")])
            .await
            .unwrap();

        let mut updated = movie("a");
        updated.title = "Renamed".to_string();
        store.upsert_movies(vec![updated]).await.unwrap();

        let all = store.get_all_movies().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].title, "Renamed");
        assert!(store.get_movie("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_event_log_is_capped() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        for i in 0..(EVENT_LOG_CAPACITY + 5) {
            let event = new_event(
                EventType::View,
                &format!("m{}", i),
                None,
                Some(start + Duration::minutes(i as i64)),
            );
            store.append(event).await.unwrap();
        }

        let all = store.recent(usize::MAX).await.unwrap();
        assert_eq!(all.len(), EVENT_LOG_CAPACITY);
        assert_eq!(all[0].movie_id, "m5");

        let last_two = store.recent(2).await.unwrap();
        let ids: Vec<&str> = last_two.iter().map(|e| e.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["m1003", "m1004"]);
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load_profile().await.unwrap(), UserProfile::default());

        let profile = UserProfile {
            archetype: Some(ArchetypeRef {
                id: "comfort_watcher".to_string(),
            }),
            dna: None,
        };
        store.save_profile(&profile).await.unwrap();
        assert_eq!(store.load_profile().await.unwrap(), profile);
    }
}

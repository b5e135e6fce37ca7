use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    ArchetypeRef, Event, EventType, Metrics, MetricsSource, NormalizedMovie, RawMovie, Review,
    TasteCard, TasteComparison, UserProfile, UserStats,
};
use crate::services::archetype::{classify, ArchetypeResult};
use crate::services::decision::{DecisionEngine, DecisionOptions, RankedMovie};
use crate::services::dna::compute_stats;
use crate::services::regret::{estimate_risk, RegretRisk};
use crate::services::semantic::{
    find_hidden_gems, gem_reason, interpret_query, GemReason, QueryInterpretation,
};
use crate::services::taste::{compare, export_card};
use crate::services::trends::{
    compute_trends, new_event, weekly_aggregates, TrendReport, WeeklyBucket, DEFAULT_WEEKS_BACK,
    EVENT_LOG_CAPACITY,
};

use super::AppState;

const DEFAULT_GEM_LIMIT: usize = 5;
const MAX_GEM_LIMIT: usize = 20;
const MAX_WEEKS_BACK: usize = 104;
const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

// Request/Response types

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub id: String,
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rewatch: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub epsilon: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub interpretation: QueryInterpretation,
    pub results: Vec<RankedMovie>,
}

#[derive(Debug, Deserialize)]
pub struct GemsParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GemPick {
    pub movie: NormalizedMovie,
    pub reason: GemReason,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub movie_id: String,
    #[serde(default)]
    pub metrics_snapshot: Option<Metrics>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyParams {
    pub weeks: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TasteCardParams {
    pub name: Option<String>,
}

/// Either card may be sent as an object or as the pasted JSON text
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub mine: Value,
    pub theirs: Value,
}

// Helpers

fn normalize_raw(raw: RawMovie, source: MetricsSource) -> AppResult<NormalizedMovie> {
    if raw.imdb_id.trim().is_empty() {
        return Err(AppError::InvalidInput("Movie id is required".to_string()));
    }
    Ok(NormalizedMovie::from_raw(raw, source))
}

async fn current_stats(state: &AppState) -> AppResult<UserStats> {
    let reviews = state.profiles.reviews().await?;
    let catalog = state.catalog.get_all_movies().await?;
    Ok(compute_stats(&reviews, &catalog))
}

/// Recomputes DNA and archetype, storing the derived copy on the profile
async fn refresh_profile(state: &AppState) -> AppResult<(UserStats, Option<ArchetypeResult>)> {
    let stats = current_stats(state).await?;
    let classification = classify(&stats);

    let profile = UserProfile {
        archetype: classification.as_ref().map(|c| ArchetypeRef {
            id: c.archetype.id.to_string(),
        }),
        dna: Some(stats.clone()),
    };
    state.profiles.save_profile(&profile).await?;

    if let Some(result) = &classification {
        tracing::debug!(
            archetype = %result.archetype.id,
            confidence = result.confidence_percent,
            "Refreshed profile archetype"
        );
    }

    Ok((stats, classification))
}

fn card_from_value(value: Value) -> AppResult<TasteCard> {
    match value {
        Value::String(raw) => TasteCard::from_json(&raw),
        other => TasteCard::from_json(&other.to_string()),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<NormalizedMovie>>> {
    let movies = state.catalog.get_all_movies().await?;
    Ok(Json(movies))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<NormalizedMovie>> {
    let movie = state
        .catalog
        .get_movie(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;
    Ok(Json(movie))
}

/// Adds one movie fetched on demand; metrics use the additive deriver
pub async fn add_movie(
    State(state): State<AppState>,
    Json(raw): Json<RawMovie>,
) -> AppResult<(StatusCode, Json<NormalizedMovie>)> {
    let movie = normalize_raw(raw, MetricsSource::Additive)?;
    state.catalog.upsert_movies(vec![movie.clone()]).await?;

    tracing::info!(movie_id = %movie.id, "Added movie to catalog");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Bulk library import; metrics use the genre-weighted deriver
pub async fn import_movies(
    State(state): State<AppState>,
    Json(raws): Json<Vec<RawMovie>>,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let movies = raws
        .into_iter()
        .map(|raw| normalize_raw(raw, MetricsSource::GenreWeighted))
        .collect::<AppResult<Vec<_>>>()?;
    let imported = movies.len();
    state.catalog.upsert_movies(movies).await?;

    tracing::info!(movie_count = imported, "Imported movies into catalog");
    Ok((StatusCode::CREATED, Json(ImportResponse { imported })))
}

pub async fn add_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    if !request.rating.is_finite() || !(0.0..=5.0).contains(&request.rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 0 and 5".to_string(),
        ));
    }
    if state.catalog.get_movie(&request.id).await?.is_none() {
        return Err(AppError::NotFound(format!("Movie {} not found", request.id)));
    }

    let review = Review {
        id: request.id,
        rating: request.rating,
        text: request.text,
        date: request.date.unwrap_or_else(Utc::now),
        rewatch: request.rewatch,
    };
    state.profiles.add_review(review.clone()).await?;
    refresh_profile(&state).await?;

    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get_dna(State(state): State<AppState>) -> AppResult<Json<UserStats>> {
    let (stats, _) = refresh_profile(&state).await?;
    Ok(Json(stats))
}

/// `null` until at least one reviewed movie exists
pub async fn get_archetype(
    State(state): State<AppState>,
) -> AppResult<Json<Option<ArchetypeResult>>> {
    let (_, classification) = refresh_profile(&state).await?;
    Ok(Json(classification))
}

pub async fn get_movie_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RegretRisk>> {
    let movie = state
        .catalog
        .get_movie(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;
    let profile = state.profiles.load_profile().await?;

    Ok(Json(estimate_risk(Some(&movie.metrics), &profile)))
}

async fn run_recommendations(
    state: &AppState,
    options: &DecisionOptions,
) -> AppResult<Vec<RankedMovie>> {
    let catalog = state.catalog.get_all_movies().await?;
    let profile = state.profiles.load_profile().await?;

    let mut rng = state.rng();
    let results = DecisionEngine::new().recommend(options, &catalog, Some(&profile), &mut rng);

    tracing::info!(
        catalog_size = catalog.len(),
        results = results.len(),
        exploration = results.iter().any(|r| r.exploration),
        "Recommendation pass finished"
    );
    Ok(results)
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(options): Json<DecisionOptions>,
) -> AppResult<Json<Vec<RankedMovie>>> {
    let results = run_recommendations(&state, &options).await?;
    Ok(Json(results))
}

/// Free-text request: interpret it, then run the regular decision pass
pub async fn recommend_from_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("Query must not be empty".to_string()));
    }

    let mut interpretation = interpret_query(&request.query, state.generator.as_deref()).await;
    interpretation.options.region = request.region;
    interpretation.options.epsilon = request.epsilon;

    tracing::info!(
        source = ?interpretation.source,
        mood = ?interpretation.options.mood,
        "Interpreted free-text query"
    );

    let results = run_recommendations(&state, &interpretation.options).await?;
    Ok(Json(QueryResponse {
        interpretation,
        results,
    }))
}

pub async fn hidden_gems(
    State(state): State<AppState>,
    Query(params): Query<GemsParams>,
) -> AppResult<Json<Vec<GemPick>>> {
    let limit = params.limit.unwrap_or(DEFAULT_GEM_LIMIT).min(MAX_GEM_LIMIT);
    let reviews = state.profiles.reviews().await?;
    let catalog = state.catalog.get_all_movies().await?;
    let stats = compute_stats(&reviews, &catalog);

    let mut picks = Vec::new();
    for movie in find_hidden_gems(&catalog, &stats, limit) {
        let reason = gem_reason(movie, &stats, state.generator.as_deref()).await;
        picks.push(GemPick {
            movie: movie.clone(),
            reason,
        });
    }

    Ok(Json(picks))
}

/// Appends a behavioral event; the snapshot defaults to the catalog metrics
pub async fn log_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    if request.movie_id.trim().is_empty() {
        return Err(AppError::InvalidInput("Movie id is required".to_string()));
    }

    let snapshot = match request.metrics_snapshot {
        Some(metrics) => Some(metrics),
        None => state
            .catalog
            .get_movie(&request.movie_id)
            .await?
            .map(|m| m.metrics),
    };

    let event = new_event(
        request.event_type,
        &request.movie_id,
        snapshot,
        request.timestamp,
    );
    state.events.append(event.clone()).await?;

    tracing::debug!(event_type = ?event.event_type, movie_id = %event.movie_id, "Logged event");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn weekly_trends(
    State(state): State<AppState>,
    Query(params): Query<WeeklyParams>,
) -> AppResult<Json<Vec<WeeklyBucket>>> {
    let weeks = params.weeks.unwrap_or(DEFAULT_WEEKS_BACK);
    if weeks == 0 || weeks > MAX_WEEKS_BACK {
        return Err(AppError::InvalidInput(format!(
            "weeks must be between 1 and {}",
            MAX_WEEKS_BACK
        )));
    }

    let events = state.events.recent(EVENT_LOG_CAPACITY).await?;
    Ok(Json(weekly_aggregates(&events, Utc::now(), weeks)))
}

/// `null` while there is not enough history to compare
pub async fn trends(State(state): State<AppState>) -> AppResult<Json<Option<TrendReport>>> {
    let events = state.events.recent(EVENT_LOG_CAPACITY).await?;
    let report = compute_trends(&events, Utc::now());

    tracing::debug!(
        events = events.len(),
        has_report = report.is_some(),
        "Computed behavioral trends"
    );
    Ok(Json(report))
}

pub async fn taste_card(
    State(state): State<AppState>,
    Query(params): Query<TasteCardParams>,
) -> AppResult<Json<TasteCard>> {
    let stats = current_stats(&state).await?;
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME);

    Ok(Json(export_card(&stats, name, Utc::now())))
}

pub async fn compare_taste_cards(
    Json(request): Json<CompareRequest>,
) -> AppResult<Json<TasteComparison>> {
    let mine = card_from_value(request.mine)?;
    let theirs = card_from_value(request.theirs)?;
    Ok(Json(compare(&mine, &theirs)))
}

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/movies", get(handlers::list_movies).post(handlers::add_movie))
        .route("/movies/import", post(handlers::import_movies))
        .route("/movies/:id", get(handlers::get_movie))
        .route("/movies/:id/risk", get(handlers::get_movie_risk))
        // Profile
        .route("/reviews", post(handlers::add_review))
        .route("/profile/dna", get(handlers::get_dna))
        .route("/profile/archetype", get(handlers::get_archetype))
        // Decisions
        .route("/recommendations", post(handlers::recommend))
        .route("/recommendations/query", post(handlers::recommend_from_query))
        .route("/gems", get(handlers::hidden_gems))
        // Behavior
        .route("/events", post(handlers::log_event))
        .route("/trends", get(handlers::trends))
        .route("/trends/weekly", get(handlers::weekly_trends))
        // Taste sharing
        .route("/taste-card", get(handlers::taste_card))
        .route("/taste-card/compare", post(handlers::compare_taste_cards))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

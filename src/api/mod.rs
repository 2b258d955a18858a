//! HTTP routes.
//!
//! `GET /recommendations/:user_id` answers with a bare JSON array of listing
//! ids; failures answer with `{"error": "..."}`.

use crate::error::{Error, Result};
use crate::models::{Listing, ObjectId};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_world))
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route("/recommendations/:user_id/listings", get(get_recommended_listings))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn hello_world() -> &'static str {
    "Hello, World!"
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    match state.recommendation_service.health_check().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "healthy".to_string(),
            service: "bidrec".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })),
        Err(e) => {
            error!("Health check failed: {}", e);
            Err(Error::StorageUnavailable {
                message: e.to_string().into(),
            })
        }
    }
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<String>>> {
    let user_id = parse_user_id(&user_id)?;

    state
        .recommendation_service
        .get_recommendations(&user_id)
        .await
        .map(Json)
        .map_err(|e| log_failure(&user_id, e))
}

async fn get_recommended_listings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Listing>>> {
    let user_id = parse_user_id(&user_id)?;

    state
        .recommendation_service
        .get_recommended_listings(&user_id)
        .await
        .map(Json)
        .map_err(|e| log_failure(&user_id, e))
}

fn parse_user_id(raw: &str) -> Result<ObjectId> {
    raw.parse().map_err(|e: Error| {
        warn!("Rejected recommendation request: {}", e);
        e
    })
}

fn log_failure(user_id: &ObjectId, e: Error) -> Error {
    error!("Failed to get recommendations for user {}: {}", user_id, e);
    e
}

use axum::{extract::State, routing::get, Json, Router};
use tracing::error;

use crate::dto::health_dto::{HealthResponse, WelcomeResponse};
use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.config.project_name),
        version: state.config.version.clone(),
    })
}

/// Siempre 200: el estado del almacén va en el cuerpo
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.health.ping().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }),
        Err(e) => {
            error!("❌ Health check fallido: {}", e);
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                database: e.to_string(),
            })
        }
    }
}

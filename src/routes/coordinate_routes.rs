use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::CoordinateController;
use crate::dto::coordinate_dto::{CoordinateFilters, CreateCoordinateRequest};
use crate::models::Coordinate;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};

pub fn create_coordinate_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_coordinate))
        .route("/batch", post(record_coordinates_batch))
        .route("/session/:session_id", get(list_session_coordinates))
}

fn controller(state: &AppState) -> CoordinateController {
    CoordinateController::new(state.sessions.clone(), state.coordinates.clone())
}

async fn record_coordinate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCoordinateRequest>,
) -> Result<Json<Coordinate>, AppError> {
    let coordinate = controller(&state).record(request).await?;
    Ok(Json(coordinate))
}

async fn record_coordinates_batch(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<CreateCoordinateRequest>>,
) -> Result<Json<Vec<Coordinate>>, AppError> {
    let coordinates = controller(&state).record_batch(requests).await?;
    Ok(Json(coordinates))
}

async fn list_session_coordinates(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<i32>,
    ApiQuery(filters): ApiQuery<CoordinateFilters>,
) -> Result<Json<Vec<Coordinate>>, AppError> {
    let coordinates = controller(&state).list_for_session(session_id, filters).await?;
    Ok(Json(coordinates))
}

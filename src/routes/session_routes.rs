use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::SessionController;
use crate::dto::session_dto::{EndSessionRequest, SessionFilters, SessionResponse, StartSessionRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};

pub fn create_session_router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_session))
        .route("/:session_id/end", post(end_session))
        .route("/driver/:driver_id", get(list_driver_sessions))
}

fn controller(state: &AppState) -> SessionController {
    SessionController::new(state.sessions.clone(), state.drivers.clone())
}

async fn start_session(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StartSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = controller(&state).start(request.driver_id).await?;
    Ok(Json(session.into()))
}

async fn end_session(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<i32>,
    ApiJson(request): ApiJson<EndSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = controller(&state).end(session_id, request).await?;
    Ok(Json(session.into()))
}

async fn list_driver_sessions(
    State(state): State<AppState>,
    ApiPath(driver_id): ApiPath<i32>,
    ApiQuery(filters): ApiQuery<SessionFilters>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = controller(&state).list_for_driver(driver_id, filters).await?;
    Ok(Json(sessions))
}

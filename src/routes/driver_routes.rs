use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::controllers::DriverController;
use crate::dto::driver_dto::{DriverFilters, PaginatedDriverResponse, UpdateDriverStatusRequest};
use crate::models::{Driver, DriverProfile};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver).get(list_drivers))
        .route("/:driver_id", get(get_driver).put(update_driver).delete(deactivate_driver))
        .route("/:driver_id/status", patch(update_driver_status))
}

async fn create_driver(
    State(state): State<AppState>,
    ApiJson(profile): ApiJson<DriverProfile>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let controller = DriverController::new(state.drivers.clone());
    let driver = controller.create(profile).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

async fn list_drivers(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<DriverFilters>,
) -> Result<Json<PaginatedDriverResponse>, AppError> {
    let controller = DriverController::new(state.drivers.clone());
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn get_driver(
    State(state): State<AppState>,
    ApiPath(driver_id): ApiPath<i32>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(state.drivers.clone());
    let driver = controller.get(driver_id).await?;
    Ok(Json(driver))
}

async fn update_driver(
    State(state): State<AppState>,
    ApiPath(driver_id): ApiPath<i32>,
    ApiJson(profile): ApiJson<DriverProfile>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(state.drivers.clone());
    let driver = controller.update(driver_id, profile).await?;
    Ok(Json(driver))
}

async fn update_driver_status(
    State(state): State<AppState>,
    ApiPath(driver_id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateDriverStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(state.drivers.clone());
    let driver = controller.set_status(driver_id, request.status).await?;
    Ok(Json(driver))
}

async fn deactivate_driver(
    State(state): State<AppState>,
    ApiPath(driver_id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let controller = DriverController::new(state.drivers.clone());
    controller.deactivate(driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

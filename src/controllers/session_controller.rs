use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::dto::session_dto::{EndSessionRequest, SessionFilters, SessionResponse};
use crate::models::{Session, SessionStatus};
use crate::repositories::{DriverRepository, SessionRepository};
use crate::utils::errors::{active_session_not_found, bad_request_error, not_found_error, AppError, AppResult};
use crate::utils::validation::{field_error, validate_finite, validate_non_negative, validate_pagination};

pub struct SessionController {
    sessions: Arc<dyn SessionRepository>,
    drivers: Arc<dyn DriverRepository>,
}

impl SessionController {
    pub fn new(sessions: Arc<dyn SessionRepository>, drivers: Arc<dyn DriverRepository>) -> Self {
        Self { sessions, drivers }
    }

    /// Abre una sesión para el conductor o devuelve la que ya está activa
    pub async fn start(&self, driver_id: i32) -> AppResult<Session> {
        if self.drivers.find_by_id(driver_id).await?.is_none() {
            return Err(not_found_error("Driver", driver_id));
        }

        if let Some(active) = self.sessions.find_active_for_driver(driver_id).await? {
            info!("🔁 Driver {} ya tiene la sesión {} activa", driver_id, active.session_id);
            return Ok(active);
        }

        let session = self.sessions.start(driver_id, Utc::now()).await?;
        info!("🟢 Sesión {} iniciada para driver {}", session.session_id, driver_id);
        Ok(session)
    }

    pub async fn end(&self, session_id: i32, request: EndSessionRequest) -> AppResult<Session> {
        let distance = request.total_distance_km;
        validate_finite(distance).map_err(|e| field_error("total_distance_km", e))?;
        validate_non_negative(distance).map_err(|e| field_error("total_distance_km", e))?;

        if self.sessions.find_active(session_id).await?.is_none() {
            return Err(active_session_not_found(session_id));
        }

        // normalize() también quita el signo de -0.0
        let total_distance_km = Decimal::from_f64_retain(distance)
            .ok_or_else(|| AppError::Internal(format!("Distance {} is not representable", distance)))?
            .round_dp(2)
            .normalize();

        // Una petición concurrente pudo cerrarla entre la lectura y el update
        let session = self
            .sessions
            .complete(session_id, Utc::now(), total_distance_km)
            .await?
            .ok_or_else(|| active_session_not_found(session_id))?;

        info!("🏁 Sesión {} completada: {} km", session_id, total_distance_km);
        Ok(session)
    }

    /// Sesiones del conductor, la más reciente primero
    pub async fn list_for_driver(&self, driver_id: i32, filters: SessionFilters) -> AppResult<Vec<SessionResponse>> {
        let status = parse_status_filter(filters.status.as_deref())?;
        let (skip, limit) = validate_pagination(filters.skip, filters.limit)?;

        let sessions = self.sessions.list_for_driver(driver_id, status, skip, limit).await?;
        Ok(sessions.into_iter().map(SessionResponse::from).collect())
    }
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<SessionStatus>> {
    match status {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<SessionStatus>()
            .map(Some)
            .map_err(|_| bad_request_error("Status must be either 'active' or 'completed'")),
    }
}

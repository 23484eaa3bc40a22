use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{Session, SessionStatus};

// Request para abrir una sesión de tracking
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub driver_id: i32,
}

// Request para cerrar una sesión
#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    pub total_distance_km: f64,
}

/// Query de listado de sesiones.
///
/// El estado llega como texto: un valor vacío equivale a no filtrar y
/// cualquier otro valor fuera de `active`/`completed` se rechaza.
#[derive(Debug, Default, Deserialize)]
pub struct SessionFilters {
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

// Response de sesión
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_distance_km: Option<f64>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            driver_id: session.driver_id,
            start_time: session.start_time,
            end_time: session.end_time,
            total_distance_km: session.total_distance_km.and_then(|d| d.to_f64()),
            status: session.status,
            created_at: session.created_at,
        }
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::dto::coordinate_dto::{CoordinateFilters, CreateCoordinateRequest};
use crate::models::coordinate::next_timestamp;
use crate::models::Coordinate;
use crate::repositories::{CoordinateRepository, SessionRepository};
use crate::utils::errors::{active_session_not_found, bad_request_error, AppError, AppResult};
use crate::utils::validation::validate_pagination;

pub struct CoordinateController {
    sessions: Arc<dyn SessionRepository>,
    coordinates: Arc<dyn CoordinateRepository>,
}

impl CoordinateController {
    pub fn new(sessions: Arc<dyn SessionRepository>, coordinates: Arc<dyn CoordinateRepository>) -> Self {
        Self { sessions, coordinates }
    }

    /// Una sola coordenada: es un lote de una fila
    pub async fn record(&self, request: CreateCoordinateRequest) -> AppResult<Coordinate> {
        self.record_batch(vec![request])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Coordinate insert returned no rows".to_string()))
    }

    /// Valida el lote completo y lo escribe de forma atómica.
    ///
    /// Orden de comprobaciones: lote vacío, rangos de cada fila, sesión
    /// única y, por último, sesión activa.
    pub async fn record_batch(&self, requests: Vec<CreateCoordinateRequest>) -> AppResult<Vec<Coordinate>> {
        if requests.is_empty() {
            return Err(bad_request_error("Empty coordinate list"));
        }

        for request in &requests {
            request.validate()?;
        }

        let session_ids: BTreeSet<i32> = requests.iter().map(|r| r.session_id).collect();
        if session_ids.len() > 1 {
            return Err(AppError::Conflict("All coordinates must belong to same session".to_string()));
        }
        let session_id = requests[0].session_id;

        if self.sessions.find_active(session_id).await?.is_none() {
            return Err(active_session_not_found(session_id));
        }

        let mut previous = None;
        let rows = requests
            .into_iter()
            .map(|request| {
                let timestamp = next_timestamp(previous);
                previous = Some(timestamp);
                request.into_new_coordinate(timestamp)
            })
            .collect();

        let created = self.coordinates.insert_batch(session_id, rows).await?;
        info!("📡 Lote de {} coordenadas registrado en la sesión {}", created.len(), session_id);
        Ok(created)
    }

    /// Coordenadas de la sesión por orden temporal; las filas sin geometría se omiten
    pub async fn list_for_session(&self, session_id: i32, filters: CoordinateFilters) -> AppResult<Vec<Coordinate>> {
        let (skip, limit) = validate_pagination(filters.skip, filters.limit)?;
        let rows = self.coordinates.list_for_session(session_id, skip, limit).await?;

        let mut coordinates = Vec::with_capacity(rows.len());
        for row in rows {
            let coord_id = row.coord_id;
            match row.decode()? {
                Some(coordinate) => coordinates.push(coordinate),
                None => debug!("⏭️ Coordenada {} sin geometría, omitida", coord_id),
            }
        }

        Ok(coordinates)
    }
}

//! Modelo de Coordinate
//!
//! Muestras GPS inmutables asociadas a una sesión activa.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::geo_point::{GeoPoint, GeoPointError};

/// Coordenada tal como se devuelve en la API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub coord_id: i32,
    pub session_id: i32,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub bearing: Option<f64>,
}

/// Coordenada validada y sellada, lista para escribirse
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoordinate {
    pub session_id: i32,
    pub timestamp: DateTime<Utc>,
    pub location: GeoPoint,
    pub speed: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub bearing: Option<f64>,
}

impl NewCoordinate {
    /// Registro devuelto al cliente: repite la lat/lon de entrada tal cual
    pub fn into_coordinate(self, coord_id: i32) -> Coordinate {
        Coordinate {
            coord_id,
            session_id: self.session_id,
            timestamp: self.timestamp,
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            speed: self.speed,
            altitude: self.altitude,
            accuracy: self.accuracy,
            bearing: self.bearing,
        }
    }
}

/// Fila almacenada con la ubicación en texto (`ST_AsText`)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredCoordinate {
    pub coord_id: i32,
    pub session_id: i32,
    pub timestamp: DateTime<Utc>,
    pub location_text: Option<String>,
    pub speed: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub bearing: Option<f64>,
}

impl StoredCoordinate {
    /// Decodifica la ubicación; `Ok(None)` si la geometría está ausente
    pub fn decode(self) -> Result<Option<Coordinate>, GeoPointError> {
        let point = match self.location_text.as_deref() {
            Some(text) => GeoPoint::parse_wkt(text)?,
            None => None,
        };

        Ok(point.map(|location| Coordinate {
            coord_id: self.coord_id,
            session_id: self.session_id,
            timestamp: self.timestamp,
            latitude: location.latitude,
            longitude: location.longitude,
            speed: self.speed,
            altitude: self.altitude,
            accuracy: self.accuracy,
            bearing: self.bearing,
        }))
    }
}

/// Sello de tiempo del servidor para la siguiente fila de un lote.
///
/// Estrictamente creciente dentro del lote a resolución de microsegundos,
/// que es la precisión de TIMESTAMPTZ.
pub fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev + Duration::microseconds(1) => prev + Duration::microseconds(1),
        _ => now,
    }
}

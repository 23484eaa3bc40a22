use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{GeoPoint, NewCoordinate};

// Request para registrar una coordenada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoordinateRequest {
    pub session_id: i32,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 0.0))]
    pub speed: f64,

    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub bearing: Option<f64>,
}

impl CreateCoordinateRequest {
    /// Fila lista para escribir con el sello de tiempo del servidor
    pub fn into_new_coordinate(self, timestamp: DateTime<Utc>) -> NewCoordinate {
        NewCoordinate {
            session_id: self.session_id,
            timestamp,
            location: GeoPoint::new(self.latitude, self.longitude),
            speed: self.speed,
            altitude: self.altitude,
            accuracy: self.accuracy,
            bearing: self.bearing,
        }
    }
}

// Query de listado de coordenadas
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateFilters {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(latitude: f64, longitude: f64, speed: f64) -> CreateCoordinateRequest {
        CreateCoordinateRequest {
            session_id: 1,
            latitude,
            longitude,
            speed,
            altitude: None,
            accuracy: None,
            bearing: None,
        }
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(request(40.4, -3.7, 0.0).validate().is_ok());
        assert!(request(90.0, 180.0, 120.0).validate().is_ok());
        assert!(request(90.1, 0.0, 1.0).validate().is_err());
        assert!(request(0.0, -180.5, 1.0).validate().is_err());
        assert!(request(0.0, 0.0, -0.5).validate().is_err());
    }

    #[test]
    fn test_into_new_coordinate_keeps_input_point() {
        let now = Utc::now();
        let row = request(40.4168, -3.7038, 15.0).into_new_coordinate(now);
        assert_eq!(row.location, GeoPoint::new(40.4168, -3.7038));
        assert_eq!(row.timestamp, now);
    }
}

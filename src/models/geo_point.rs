//! Codec de puntos geográficos
//!
//! Convierte pares (latitud, longitud) a la representación WKT/EWKT que
//! PostGIS acepta en `ST_GeogFromText` y decodifica la salida de `ST_AsText`.
//! El orden de ordenadas es siempre (longitud, latitud).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sistema de referencia WGS84
pub const WGS84_SRID: i32 = 4326;

/// Punto geográfico en grados decimales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Errores al decodificar un punto en texto
#[derive(Debug, Error, PartialEq)]
pub enum GeoPointError {
    #[error("expected POINT(<lon> <lat>), got '{0}'")]
    NotAPoint(String),

    #[error("expected exactly two ordinates, got {0}")]
    OrdinateCount(usize),

    #[error("invalid ordinate '{0}'")]
    InvalidOrdinate(String),
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `POINT(lon lat)`
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// `SRID=4326;POINT(lon lat)`, forma de escritura hacia PostGIS
    pub fn to_ewkt(&self) -> String {
        format!("SRID={};{}", WGS84_SRID, self.to_wkt())
    }

    /// Decodifica el texto devuelto por `ST_AsText`.
    ///
    /// Texto vacío o `POINT EMPTY` devuelve `Ok(None)`: la geometría está
    /// ausente, no corrupta.
    pub fn parse_wkt(text: &str) -> Result<Option<GeoPoint>, GeoPointError> {
        let mut body = text.trim();
        if body.is_empty() {
            return Ok(None);
        }

        // Prefijo EWKT opcional
        if has_prefix(body, "SRID=") {
            body = match body.find(';') {
                Some(pos) => body[pos + 1..].trim_start(),
                None => return Err(GeoPointError::NotAPoint(text.to_string())),
            };
        }

        if !has_prefix(body, "POINT") {
            return Err(GeoPointError::NotAPoint(text.to_string()));
        }
        let rest = body[5..].trim();

        if rest.eq_ignore_ascii_case("EMPTY") {
            return Ok(None);
        }

        let payload = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| GeoPointError::NotAPoint(text.to_string()))?;

        let tokens: Vec<&str> = payload.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(GeoPointError::OrdinateCount(tokens.len()));
        }

        let longitude = parse_ordinate(tokens[0])?;
        let latitude = parse_ordinate(tokens[1])?;

        Ok(Some(GeoPoint { latitude, longitude }))
    }
}

fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

fn parse_ordinate(token: &str) -> Result<f64, GeoPointError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeoPointError::InvalidOrdinate(token.to_string()))
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wkt_puts_longitude_first() {
        let point = GeoPoint::new(48.8566, 2.3522);
        assert_eq!(point.to_wkt(), "POINT(2.3522 48.8566)");
        assert_eq!(point.to_ewkt(), "SRID=4326;POINT(2.3522 48.8566)");
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let samples = [
            (0.0, 0.0),
            (90.0, 180.0),
            (-90.0, -180.0),
            (48.856613, 2.352222),
            (-33.868820, 151.209290),
            (0.1 + 0.2, -179.99999999),
        ];
        for (lat, lon) in samples {
            let point = GeoPoint::new(lat, lon);
            let decoded = GeoPoint::parse_wkt(&point.to_wkt()).unwrap().unwrap();
            assert_eq!(decoded, point);
            let decoded = GeoPoint::parse_wkt(&point.to_ewkt()).unwrap().unwrap();
            assert_eq!(decoded, point);
        }
    }

    #[test]
    fn test_parse_accepts_postgis_spacing_and_case() {
        let point = GeoPoint::parse_wkt("point ( -73.9857 40.7484 )").unwrap().unwrap();
        assert_eq!(point.longitude, -73.9857);
        assert_eq!(point.latitude, 40.7484);
    }

    #[test]
    fn test_parse_absent_geometry() {
        assert_eq!(GeoPoint::parse_wkt("").unwrap(), None);
        assert_eq!(GeoPoint::parse_wkt("   ").unwrap(), None);
        assert_eq!(GeoPoint::parse_wkt("POINT EMPTY").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert_eq!(GeoPoint::parse_wkt("POINT(1)"), Err(GeoPointError::OrdinateCount(1)));
        assert_eq!(GeoPoint::parse_wkt("POINT(1 2 3)"), Err(GeoPointError::OrdinateCount(3)));
        assert_eq!(
            GeoPoint::parse_wkt("POINT(abc 2)"),
            Err(GeoPointError::InvalidOrdinate("abc".to_string()))
        );
        assert!(matches!(GeoPoint::parse_wkt("LINESTRING(0 0, 1 1)"), Err(GeoPointError::NotAPoint(_))));
        assert!(matches!(GeoPoint::parse_wkt("POINT(1 2"), Err(GeoPointError::NotAPoint(_))));
        assert!(matches!(GeoPoint::parse_wkt("SRID=4326"), Err(GeoPointError::NotAPoint(_))));
    }
}

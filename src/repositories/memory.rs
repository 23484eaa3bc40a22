//! Almacén en memoria
//!
//! Implementa los mismos traits de repositorio que PostgreSQL y replica
//! las restricciones del schema (teléfono único, una sesión activa por
//! conductor, CHECKs de timeline y velocidad, lotes atómicos). Se usa en
//! los tests y con `STORAGE_BACKEND=memory` en desarrollo local.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::driver::{StoredContactInfo, StoredVehicleDetails};
use crate::models::{
    Coordinate, Driver, DriverProfile, DriverStatus, NewCoordinate, Session, SessionStatus,
    StoredCoordinate,
};
use crate::repositories::{CoordinateRepository, DriverRepository, SessionRepository, StoreHealth};
use crate::utils::errors::{active_session_not_found, duplicate_phone_error, AppError, AppResult};

#[derive(Debug, Clone)]
struct DriverRecord {
    driver_id: i32,
    name: String,
    contact_info: Value,
    vehicle_details: Value,
    status: DriverStatus,
    registration_date: DateTime<Utc>,
}

impl DriverRecord {
    fn phone(&self) -> Option<&str> {
        self.contact_info.get("phone").and_then(Value::as_str)
    }

    fn to_driver(&self) -> Driver {
        Driver {
            driver_id: self.driver_id,
            name: self.name.clone(),
            contact_info: StoredContactInfo::from_json(self.contact_info.clone()).into_contact_info(),
            vehicle_details: StoredVehicleDetails::from_json(self.vehicle_details.clone())
                .into_vehicle_details(),
            status: self.status,
            registration_date: self.registration_date,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    drivers: BTreeMap<i32, DriverRecord>,
    sessions: BTreeMap<i32, Session>,
    coordinates: Vec<StoredCoordinate>,
    last_driver_id: i32,
    last_session_id: i32,
    last_coord_id: i32,
}

impl Tables {
    fn phone_taken(&self, phone: &str, exclude_id: Option<i32>) -> Option<&DriverRecord> {
        self.drivers
            .values()
            .find(|record| record.phone() == Some(phone) && Some(record.driver_id) != exclude_id)
    }

    fn active_session_for_driver(&self, driver_id: i32) -> Option<&Session> {
        self.sessions
            .values()
            .find(|session| session.driver_id == driver_id && session.is_active())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Storage(format!("Error encoding JSONB: {}", e)))
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un conductor con el JSONB tal cual, sin validar.
    ///
    /// Sirve para sembrar registros antiguos con forma laxa.
    pub async fn insert_raw_driver(&self, name: &str, contact_info: Value, vehicle_details: Value) -> i32 {
        let mut tables = self.tables.write().await;
        tables.last_driver_id += 1;
        let driver_id = tables.last_driver_id;
        tables.drivers.insert(
            driver_id,
            DriverRecord {
                driver_id,
                name: name.to_string(),
                contact_info,
                vehicle_details,
                status: DriverStatus::Active,
                registration_date: Utc::now(),
            },
        );
        driver_id
    }

    /// Inserta una fila de coordenada con la ubicación en texto, sin comprobar la sesión
    pub async fn insert_raw_coordinate(&self, session_id: i32, location_text: Option<&str>, speed: f64) -> i32 {
        let mut tables = self.tables.write().await;
        tables.last_coord_id += 1;
        let coord_id = tables.last_coord_id;
        tables.coordinates.push(StoredCoordinate {
            coord_id,
            session_id,
            timestamp: Utc::now(),
            location_text: location_text.map(str::to_string),
            speed,
            altitude: None,
            accuracy: None,
            bearing: None,
        });
        coord_id
    }

    /// Número total de coordenadas guardadas
    pub async fn coordinate_count(&self) -> usize {
        self.tables.read().await.coordinates.len()
    }

    /// Número total de sesiones guardadas
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }
}

#[async_trait]
impl DriverRepository for MemoryStore {
    async fn create(&self, profile: &DriverProfile, registered_at: DateTime<Utc>) -> AppResult<Driver> {
        let contact_info = to_json(&profile.contact_info)?;
        let vehicle_details = to_json(&profile.vehicle_details)?;

        let mut tables = self.tables.write().await;
        if tables.phone_taken(&profile.contact_info.phone, None).is_some() {
            return Err(duplicate_phone_error());
        }

        tables.last_driver_id += 1;
        let record = DriverRecord {
            driver_id: tables.last_driver_id,
            name: profile.name.clone(),
            contact_info,
            vehicle_details,
            status: DriverStatus::Active,
            registration_date: registered_at,
        };
        let driver = record.to_driver();
        tables.drivers.insert(record.driver_id, record);
        Ok(driver)
    }

    async fn find_by_id(&self, driver_id: i32) -> AppResult<Option<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.get(&driver_id).map(DriverRecord::to_driver))
    }

    async fn find_by_phone(&self, phone: &str, exclude_id: Option<i32>) -> AppResult<Option<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.phone_taken(phone, exclude_id).map(DriverRecord::to_driver))
    }

    async fn list(&self, status: Option<DriverStatus>, skip: i64, limit: i64) -> AppResult<(Vec<Driver>, i64)> {
        let tables = self.tables.read().await;
        let matching: Vec<&DriverRecord> = tables
            .drivers
            .values()
            .filter(|record| status.map_or(true, |s| record.status == s))
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(DriverRecord::to_driver)
            .collect();

        Ok((page, total))
    }

    async fn update_profile(&self, driver_id: i32, profile: &DriverProfile) -> AppResult<Option<Driver>> {
        let contact_info = to_json(&profile.contact_info)?;
        let vehicle_details = to_json(&profile.vehicle_details)?;

        let mut tables = self.tables.write().await;
        if tables.phone_taken(&profile.contact_info.phone, Some(driver_id)).is_some() {
            return Err(duplicate_phone_error());
        }

        Ok(tables.drivers.get_mut(&driver_id).map(|record| {
            record.name = profile.name.clone();
            record.contact_info = contact_info;
            record.vehicle_details = vehicle_details;
            record.to_driver()
        }))
    }

    async fn set_status(&self, driver_id: i32, status: DriverStatus) -> AppResult<Option<Driver>> {
        let mut tables = self.tables.write().await;
        Ok(tables.drivers.get_mut(&driver_id).map(|record| {
            record.status = status;
            record.to_driver()
        }))
    }

    async fn deactivate(&self, driver_id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.drivers.get_mut(&driver_id) {
            Some(record) => {
                record.status = DriverStatus::Inactive;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_active(&self, session_id: i32) -> AppResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.get(&session_id).filter(|s| s.is_active()).cloned())
    }

    async fn find_active_for_driver(&self, driver_id: i32) -> AppResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.active_session_for_driver(driver_id).cloned())
    }

    async fn start(&self, driver_id: i32, started_at: DateTime<Utc>) -> AppResult<Session> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.active_session_for_driver(driver_id) {
            return Ok(existing.clone());
        }
        if !tables.drivers.contains_key(&driver_id) {
            return Err(AppError::Storage(format!(
                "Error starting session: driver {} does not exist",
                driver_id
            )));
        }

        tables.last_session_id += 1;
        let session = Session {
            session_id: tables.last_session_id,
            driver_id,
            start_time: started_at,
            end_time: None,
            total_distance_km: None,
            status: SessionStatus::Active,
            created_at: started_at,
        };
        tables.sessions.insert(session.session_id, session.clone());
        Ok(session)
    }

    async fn complete(
        &self,
        session_id: i32,
        ended_at: DateTime<Utc>,
        total_distance_km: Decimal,
    ) -> AppResult<Option<Session>> {
        let mut tables = self.tables.write().await;
        let session = match tables.sessions.get_mut(&session_id) {
            Some(session) if session.is_active() => session,
            _ => return Ok(None),
        };

        if !Session::timeline_is_valid(session.start_time, Some(ended_at)) {
            return Err(AppError::Storage(
                "Error ending session: new row for relation \"sessions\" violates check constraint \"valid_session_timeline\""
                    .to_string(),
            ));
        }
        if total_distance_km < Decimal::ZERO {
            return Err(AppError::Storage(
                "Error ending session: new row for relation \"sessions\" violates check constraint \"valid_session_distance\""
                    .to_string(),
            ));
        }

        session.end_time = Some(ended_at);
        session.total_distance_km = Some(total_distance_km.round_dp(2));
        session.status = SessionStatus::Completed;
        Ok(Some(session.clone()))
    }

    async fn list_for_driver(
        &self,
        driver_id: i32,
        status: Option<SessionStatus>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Session>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.driver_id == driver_id && status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();

        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.session_id.cmp(&a.session_id)));

        Ok(sessions.into_iter().skip(skip as usize).take(limit as usize).collect())
    }
}

#[async_trait]
impl CoordinateRepository for MemoryStore {
    async fn insert_batch(&self, session_id: i32, rows: Vec<NewCoordinate>) -> AppResult<Vec<Coordinate>> {
        let mut tables = self.tables.write().await;
        if tables.sessions.get(&session_id).map_or(true, |s| !s.is_active()) {
            return Err(active_session_not_found(session_id));
        }

        // Se prepara el lote completo antes de tocar la tabla: un fallo deja todo igual
        let mut next_id = tables.last_coord_id;
        let mut staged = Vec::with_capacity(rows.len());
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            if row.session_id != session_id || !tables.sessions.contains_key(&row.session_id) {
                return Err(AppError::Storage(format!(
                    "Error inserting coordinate: session {} is not part of this batch",
                    row.session_id
                )));
            }
            if !(row.speed >= 0.0) {
                return Err(AppError::Storage(
                    "Error inserting coordinate: new row for relation \"coordinates\" violates check constraint \"valid_coordinate_speed\""
                        .to_string(),
                ));
            }

            next_id += 1;
            staged.push(StoredCoordinate {
                coord_id: next_id,
                session_id: row.session_id,
                timestamp: row.timestamp,
                location_text: Some(row.location.to_wkt()),
                speed: row.speed,
                altitude: row.altitude,
                accuracy: row.accuracy,
                bearing: row.bearing,
            });
            created.push(row.into_coordinate(next_id));
        }

        tables.last_coord_id = next_id;
        tables.coordinates.extend(staged);
        Ok(created)
    }

    async fn list_for_session(&self, session_id: i32, skip: i64, limit: i64) -> AppResult<Vec<StoredCoordinate>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<StoredCoordinate> = tables
            .coordinates
            .iter()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.coord_id.cmp(&b.coord_id)));

        Ok(rows.into_iter().skip(skip as usize).take(limit as usize).collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use chrono::Duration;
    use serde_json::json;

    fn new_row(session_id: i32, speed: f64) -> NewCoordinate {
        NewCoordinate {
            session_id,
            timestamp: Utc::now(),
            location: GeoPoint::new(40.4168, -3.7038),
            speed,
            altitude: None,
            accuracy: None,
            bearing: None,
        }
    }

    async fn store_with_active_session() -> (MemoryStore, Session) {
        let store = MemoryStore::new();
        let driver_id = store
            .insert_raw_driver("Luis", json!({ "phone": "+34611111111" }), json!({}))
            .await;
        let session = store.start(driver_id, Utc::now()).await.unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back_whole_batch() {
        let (store, session) = store_with_active_session().await;
        let rows = vec![
            new_row(session.session_id, 10.0),
            new_row(session.session_id, -1.0),
            new_row(session.session_id, 12.0),
        ];

        let result = store.insert_batch(session.session_id, rows).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(store.coordinate_count().await, 0);

        // Los ids no se consumen por un lote fallido
        let created = store
            .insert_batch(session.session_id, vec![new_row(session.session_id, 5.0)])
            .await
            .unwrap();
        assert_eq!(created[0].coord_id, 1);
    }

    #[tokio::test]
    async fn test_timeline_check_rejects_early_end() {
        let (store, session) = store_with_active_session().await;
        let too_early = session.start_time - Duration::seconds(1);

        let result = store.complete(session.session_id, too_early, Decimal::new(1250, 2)).await;
        assert!(matches!(result, Err(AppError::Storage(msg)) if msg.contains("valid_session_timeline")));

        // La sesión sigue activa
        assert!(store.find_active(session.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_negative_zero_distance_passes_distance_check() {
        let (store, session) = store_with_active_session().await;
        let negative_zero = Decimal::from_f64_retain(-0.0).unwrap();

        let ended = store
            .complete(session.session_id, Utc::now() + Duration::seconds(1), negative_zero)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ended.total_distance_km, Some(Decimal::ZERO));

        let (store, session) = store_with_active_session().await;
        let result = store
            .complete(session.session_id, Utc::now() + Duration::seconds(1), Decimal::new(-1, 2))
            .await;
        assert!(matches!(result, Err(AppError::Storage(msg)) if msg.contains("valid_session_distance")));
    }

    #[tokio::test]
    async fn test_start_is_idempotent_inside_the_store() {
        let (store, session) = store_with_active_session().await;
        let again = store.start(session.driver_id, Utc::now()).await.unwrap();
        assert_eq!(again.session_id, session.session_id);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_start_requires_existing_driver() {
        let store = MemoryStore::new();
        assert!(matches!(store.start(99, Utc::now()).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_insert_into_completed_session_is_not_found() {
        let (store, session) = store_with_active_session().await;
        store
            .complete(session.session_id, Utc::now() + Duration::seconds(1), Decimal::ZERO)
            .await
            .unwrap();

        let result = store
            .insert_batch(session.session_id, vec![new_row(session.session_id, 3.0)])
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.coordinate_count().await, 0);
    }
}

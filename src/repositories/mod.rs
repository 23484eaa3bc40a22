//! Repositorios de acceso a datos
//!
//! Cada entidad expone un trait de repositorio con dos implementaciones:
//! PostgreSQL/PostGIS (`Pg*Repository`) y el almacén en memoria
//! (`memory::MemoryStore`) usado en tests y desarrollo local.
//!
//! Las invariantes de unicidad (teléfono, una sesión activa por conductor)
//! las garantiza el almacén, no la comprobación previa de los controllers.

pub mod coordinate_repository;
pub mod driver_repository;
pub mod memory;
pub mod session_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    Coordinate, Driver, DriverProfile, DriverStatus, NewCoordinate, Session, SessionStatus,
    StoredCoordinate,
};
use crate::utils::errors::AppResult;

pub use coordinate_repository::PgCoordinateRepository;
pub use driver_repository::PgDriverRepository;
pub use memory::MemoryStore;
pub use session_repository::PgSessionRepository;

/// Índice único sobre `contact_info->>'phone'`
pub const UNIQUE_DRIVER_PHONE: &str = "uq_drivers_phone";

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn create(&self, profile: &DriverProfile, registered_at: DateTime<Utc>) -> AppResult<Driver>;

    async fn find_by_id(&self, driver_id: i32) -> AppResult<Option<Driver>>;

    /// Busca otro conductor con el mismo teléfono, excluyendo `exclude_id`
    async fn find_by_phone(&self, phone: &str, exclude_id: Option<i32>) -> AppResult<Option<Driver>>;

    /// Página de conductores y total que cumple el filtro
    async fn list(&self, status: Option<DriverStatus>, skip: i64, limit: i64) -> AppResult<(Vec<Driver>, i64)>;

    /// Reemplaza nombre, contacto y vehículo
    async fn update_profile(&self, driver_id: i32, profile: &DriverProfile) -> AppResult<Option<Driver>>;

    async fn set_status(&self, driver_id: i32, status: DriverStatus) -> AppResult<Option<Driver>>;

    /// Baja lógica: la fila nunca se elimina
    async fn deactivate(&self, driver_id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_active(&self, session_id: i32) -> AppResult<Option<Session>>;

    async fn find_active_for_driver(&self, driver_id: i32) -> AppResult<Option<Session>>;

    /// Abre una sesión activa o devuelve la que ya exista para el conductor
    async fn start(&self, driver_id: i32, started_at: DateTime<Utc>) -> AppResult<Session>;

    /// `None` si la sesión no existe o no está activa
    async fn complete(
        &self,
        session_id: i32,
        ended_at: DateTime<Utc>,
        total_distance_km: Decimal,
    ) -> AppResult<Option<Session>>;

    async fn list_for_driver(
        &self,
        driver_id: i32,
        status: Option<SessionStatus>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Session>>;
}

#[async_trait]
pub trait CoordinateRepository: Send + Sync {
    /// Inserta todas las filas en una única transacción, o ninguna.
    ///
    /// Comprueba dentro de la transacción que la sesión sigue activa.
    async fn insert_batch(&self, session_id: i32, rows: Vec<NewCoordinate>) -> AppResult<Vec<Coordinate>>;

    /// Filas ordenadas por timestamp ascendente, con la ubicación sin decodificar
    async fn list_for_session(&self, session_id: i32, skip: i64, limit: i64) -> AppResult<Vec<StoredCoordinate>>;
}

/// Comprobación de disponibilidad del almacén para `/health`
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

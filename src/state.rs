//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: configuración y repositorios.

use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::database::DatabaseConnection;
use crate::repositories::{
    CoordinateRepository, DriverRepository, MemoryStore, PgCoordinateRepository, PgDriverRepository,
    PgSessionRepository, SessionRepository, StoreHealth,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub drivers: Arc<dyn DriverRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub coordinates: Arc<dyn CoordinateRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl AppState {
    /// Repositorios respaldados por PostgreSQL/PostGIS
    pub fn postgres(connection: DatabaseConnection, config: EnvironmentConfig) -> Self {
        let pool = connection.pool().clone();
        Self {
            config,
            drivers: Arc::new(PgDriverRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            coordinates: Arc::new(PgCoordinateRepository::new(pool)),
            health: Arc::new(connection),
        }
    }

    /// Todos los repositorios sobre el mismo almacén en memoria
    pub fn in_memory(store: MemoryStore, config: EnvironmentConfig) -> Self {
        Self {
            config,
            drivers: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            coordinates: Arc::new(store.clone()),
            health: Arc::new(store),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::models::{Driver, DriverStatus};

/// Query de listado de conductores.
///
/// Un estado vacío equivale a no filtrar.
#[derive(Debug, Default, Deserialize)]
pub struct DriverFilters {
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

// Request para cambiar el estado de un conductor
#[derive(Debug, Deserialize)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

// Página de conductores
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedDriverResponse {
    pub total: i64,
    pub items: Vec<Driver>,
    pub page: i64,
    pub pages: i64,
}

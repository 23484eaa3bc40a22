//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::geo_point::GeoPointError;
use crate::repositories::UNIQUE_DRIVER_PHONE;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Fallo de lectura contra la base de datos
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Punto geográfico almacenado que no se puede decodificar
    #[error("Malformed point: {0}")]
    MalformedPoint(#[from] GeoPointError),

    /// Fallo de escritura; la transacción ya fue revertida
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código HTTP asociado a cada variante.
    ///
    /// Conflictos y fallos de escritura se exponen como 400: el cliente no
    /// puede distinguir una restricción violada de un fallo de conectividad.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::BadRequest(_)
            | AppError::Storage(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::MalformedPoint(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ {}", self);
        } else {
            warn!("⚠️ {}", self);
        }

        let error_response = match self {
            AppError::Database(e) => ErrorResponse {
                error: "Database Error".to_string(),
                message: "An error occurred while accessing the database".to_string(),
                details: Some(json!({ "sql_error": e.to_string() })),
                code: Some("DB_ERROR".to_string()),
            },

            AppError::Validation(e) => ErrorResponse {
                error: "Validation Error".to_string(),
                message: "The provided data is invalid".to_string(),
                details: Some(json!(e)),
                code: Some("VALIDATION_ERROR".to_string()),
            },

            AppError::NotFound(msg) => ErrorResponse {
                error: "Not Found".to_string(),
                message: msg,
                details: None,
                code: Some("NOT_FOUND".to_string()),
            },

            AppError::Conflict(msg) => ErrorResponse {
                error: "Conflict".to_string(),
                message: msg,
                details: None,
                code: Some("CONFLICT".to_string()),
            },

            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg,
                details: None,
                code: Some("BAD_REQUEST".to_string()),
            },

            AppError::MalformedPoint(e) => ErrorResponse {
                error: "Malformed Point".to_string(),
                message: "A stored location could not be decoded".to_string(),
                details: Some(json!({ "point_error": e.to_string() })),
                code: Some("MALFORMED_POINT".to_string()),
            },

            AppError::Storage(msg) => ErrorResponse {
                error: "Storage Error".to_string(),
                message: msg,
                details: None,
                code: Some("STORAGE_ERROR".to_string()),
            },

            AppError::Internal(msg) => ErrorResponse {
                error: "Internal Server Error".to_string(),
                message: "An unexpected error occurred".to_string(),
                details: Some(json!({ "internal_error": msg })),
                code: Some("INTERNAL_ERROR".to_string()),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Convierte un error de escritura de sqlx en el error expuesto al cliente.
///
/// La violación del índice único de teléfono es la señal autoritativa de
/// duplicado; cualquier otro fallo conserva el mensaje original.
pub fn storage_error(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &e {
        if db_error.constraint() == Some(UNIQUE_DRIVER_PHONE) {
            return duplicate_phone_error();
        }
    }
    AppError::Storage(format!("{}: {}", context, e))
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{} with ID {} not found", resource, id))
}

/// Sesión inexistente o ya completada: ambos casos son indistinguibles
pub fn active_session_not_found(session_id: i32) -> AppError {
    AppError::NotFound(format!("Active session with id {} not found", session_id))
}

pub fn duplicate_phone_error() -> AppError {
    AppError::Conflict("Driver with this phone number already exists".to_string())
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

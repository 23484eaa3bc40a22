//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! que no se expresan con los atributos de `validator`.

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::utils::errors::AppError;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un flotante sea finito (NaN e infinitos no se pueden almacenar)
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        let mut error = ValidationError::new("finite");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Envuelve un `ValidationError` de campo en el error de la aplicación
pub fn field_error(field: &'static str, error: ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Normaliza `skip`/`limit` de la query aplicando valores por defecto
pub fn validate_pagination(skip: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), AppError> {
    let skip = skip.unwrap_or(DEFAULT_SKIP);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    if skip < 0 {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &0);
        error.add_param("actual".into(), &skip);
        return Err(field_error("skip", error));
    }
    if limit < 1 {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &1);
        error.add_param("actual".into(), &limit);
        return Err(field_error("limit", error));
    }
    Ok((skip, limit))
}

/// Número de página (base 1) para una ventana `skip`/`limit`
pub fn page_number(skip: i64, limit: i64) -> i64 {
    skip / limit + 1
}

/// Total de páginas necesarias para `total` elementos
pub fn page_count(total: i64, limit: i64) -> i64 {
    total / limit + i64::from(total % limit != 0)
}

//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos y las variables
//! de entorno del servicio.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::{EnvironmentConfig, StorageBackend};

use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Lee una variable con valor por defecto
pub(crate) fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Lee y parsea una variable; el error nombra la variable
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Lee una variable obligatoria
pub(crate) fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("{} must be set in environment variables", key))
}

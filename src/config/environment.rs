//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::config::{env_or, parse_env};

/// Almacén de datos que respalda los repositorios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => f.write_str("postgres"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub project_name: String,
    pub version: String,
    pub api_prefix: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub log_level: tracing::Level,
    pub storage_backend: StorageBackend,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            project_name: "Transit Advertising API".to_string(),
            version: "1.0.0".to_string(),
            api_prefix: "/api/v1".to_string(),
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
            log_level: tracing::Level::INFO,
            storage_backend: StorageBackend::Postgres,
        }
    }
}

impl EnvironmentConfig {
    /// Carga la configuración desde el entorno, con valores por defecto
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_prefix = env_or("API_V1_STR", &defaults.api_prefix);
        let log_level = env_or("LOG_LEVEL", "info");

        Ok(Self {
            project_name: env_or("PROJECT_NAME", &defaults.project_name),
            version: env_or("VERSION", &defaults.version),
            api_prefix: normalize_prefix(&api_prefix),
            environment: env_or("ENVIRONMENT", &defaults.environment),
            host: env_or("HOST", &defaults.host),
            port: parse_env("PORT", defaults.port)?,
            cors_origins: parse_origins(&env_or("CORS_ORIGINS", "")),
            log_level: log_level
                .parse()
                .map_err(|_| anyhow!("LOG_LEVEL has an invalid value '{}'", log_level))?,
            storage_backend: parse_env("STORAGE_BACKEND", defaults.storage_backend)?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Siempre con barra inicial y sin barra final; "/" queda vacío
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

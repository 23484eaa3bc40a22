//! Módulo de base de datos
//!
//! Maneja la conexión, las migraciones y el health check de PostgreSQL.

pub mod connection;

pub use connection::DatabaseConnection;

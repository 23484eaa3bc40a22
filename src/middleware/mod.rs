//! Middleware del sistema
//!
//! Capas HTTP compartidas por todas las rutas.

pub mod cors;

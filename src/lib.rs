//! Backend de tracking de flota
//!
//! Registro de conductores, sesiones de tracking por conductor e ingesta
//! de coordenadas GPS sobre PostgreSQL/PostGIS.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;

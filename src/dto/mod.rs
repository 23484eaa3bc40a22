//! DTOs de la API
//!
//! Estructuras de request/response que viajan por HTTP.

pub mod coordinate_dto;
pub mod driver_dto;
pub mod health_dto;
pub mod session_dto;

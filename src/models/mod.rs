//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL/PostGIS de tracking.

pub mod coordinate;
pub mod driver;
pub mod geo_point;
pub mod session;

pub use coordinate::{Coordinate, NewCoordinate, StoredCoordinate};
pub use driver::{ContactInfo, Driver, DriverProfile, DriverStatus, VehicleDetails};
pub use geo_point::{GeoPoint, GeoPointError};
pub use session::{Session, SessionStatus};

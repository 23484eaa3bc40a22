//! Controllers
//!
//! Reglas de negocio del registro de conductores, del ciclo de vida de
//! sesiones y de la ingesta de coordenadas. No conocen HTTP ni SQL.

pub mod coordinate_controller;
pub mod driver_controller;
pub mod session_controller;

pub use coordinate_controller::CoordinateController;
pub use driver_controller::DriverController;
pub use session_controller::SessionController;

use serde::{Deserialize, Serialize};

// Response de /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

// Response de la raíz
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
}

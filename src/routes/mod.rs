//! Rutas HTTP
//!
//! Monta los routers de cada recurso bajo el prefijo de la API y aplica
//! las capas de trazas, compresión y CORS.

pub mod coordinate_routes;
pub mod driver_routes;
pub mod health_routes;
pub mod session_routes;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/sessions", session_routes::create_session_router())
        .nest("/coordinates", coordinate_routes::create_coordinate_router());

    let prefix = state.config.api_prefix.trim_end_matches('/');
    let app = Router::new().merge(health_routes::create_health_router());
    let app = if prefix.is_empty() {
        app.merge(api)
    } else {
        app.nest(prefix, api)
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use transit_tracking::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use transit_tracking::database::DatabaseConnection;
use transit_tracking::repositories::MemoryStore;
use transit_tracking::routes::create_app;
use transit_tracking::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚌 {} v{}", config.project_name, config.version);
    info!("================================================");
    info!("🌍 Entorno: {} | almacén: {}", config.environment, config.storage_backend);

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let connection = match DatabaseConnection::connect(&db_config).await {
                Ok(connection) => connection,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };

            if db_config.run_migrations {
                connection.run_migrations().await?;
            }

            AppState::postgres(connection, config.clone())
        }
        StorageBackend::Memory => {
            if !config.is_development() {
                warn!("⚠️ Almacén en memoria fuera de desarrollo: los datos se pierden al reiniciar");
            }
            AppState::in_memory(MemoryStore::new(), config.clone())
        }
    };

    let app = create_app(state);
    let prefix = &config.api_prefix;

    info!("🌐 Servidor iniciando en http://{}", config.server_url());
    info!("🔍 Endpoints disponibles:");
    info!("   GET  / - Bienvenida");
    info!("   GET  /health - Health check");
    info!("👤 Conductores:");
    info!("   POST   {}/drivers - Registrar conductor", prefix);
    info!("   GET    {}/drivers - Listar conductores", prefix);
    info!("   GET    {}/drivers/:id - Obtener conductor", prefix);
    info!("   PUT    {}/drivers/:id - Actualizar conductor", prefix);
    info!("   PATCH  {}/drivers/:id/status - Cambiar estado", prefix);
    info!("   DELETE {}/drivers/:id - Desactivar conductor", prefix);
    info!("🟢 Sesiones:");
    info!("   POST {}/sessions/start - Iniciar sesión", prefix);
    info!("   POST {}/sessions/:id/end - Finalizar sesión", prefix);
    info!("   GET  {}/sessions/driver/:driver_id - Sesiones del conductor", prefix);
    info!("📍 Coordenadas:");
    info!("   POST {}/coordinates - Registrar coordenada", prefix);
    info!("   POST {}/coordinates/batch - Registrar lote", prefix);
    info!("   GET  {}/coordinates/session/:session_id - Coordenadas de la sesión", prefix);

    let listener = tokio::net::TcpListener::bind(config.server_url()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

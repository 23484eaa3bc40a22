use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use crate::models::{Session, SessionStatus};
use crate::repositories::SessionRepository;
use crate::utils::errors::{storage_error, AppError, AppResult};

const SESSION_COLUMNS: &str =
    "session_id, driver_id, start_time, end_time, total_distance_km, status, created_at";

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    session_id: i32,
    driver_id: i32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    total_distance_km: Option<Decimal>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            session_id: row.session_id,
            driver_id: row.driver_id,
            start_time: row.start_time,
            end_time: row.end_time,
            total_distance_km: row.total_distance_km,
            status: row.status.parse::<SessionStatus>().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_active(&self, session_id: i32) -> AppResult<Option<Session>> {
        let query = format!(
            "SELECT {} FROM sessions WHERE session_id = $1 AND status = 'active'",
            SESSION_COLUMNS
        );

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Session::try_from).transpose()
    }

    async fn find_active_for_driver(&self, driver_id: i32) -> AppResult<Option<Session>> {
        let query = format!(
            "SELECT {} FROM sessions WHERE driver_id = $1 AND status = 'active'",
            SESSION_COLUMNS
        );

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Session::try_from).transpose()
    }

    async fn start(&self, driver_id: i32, started_at: DateTime<Utc>) -> AppResult<Session> {
        let query = format!(
            r#"
            INSERT INTO sessions (driver_id, start_time, status, created_at)
            VALUES ($1, $2, 'active', $2)
            ON CONFLICT (driver_id) WHERE status = 'active' DO NOTHING
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );

        let inserted = sqlx::query_as::<_, SessionRow>(&query)
            .bind(driver_id)
            .bind(started_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Error starting session", e))?;

        match inserted {
            Some(row) => Session::try_from(row),
            // Otra petición abrió la sesión entre la comprobación y el insert
            None => {
                info!("🔁 Sesión activa concurrente para driver {}, reutilizándola", driver_id);
                self.find_active_for_driver(driver_id).await?.ok_or_else(|| {
                    AppError::Storage(format!(
                        "Error starting session: active session for driver {} vanished",
                        driver_id
                    ))
                })
            }
        }
    }

    async fn complete(
        &self,
        session_id: i32,
        ended_at: DateTime<Utc>,
        total_distance_km: Decimal,
    ) -> AppResult<Option<Session>> {
        let query = format!(
            r#"
            UPDATE sessions
            SET end_time = $2, total_distance_km = $3, status = 'completed'
            WHERE session_id = $1 AND status = 'active'
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );

        // El CHECK valid_session_timeline rechaza end_time <= start_time
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .bind(ended_at)
            .bind(total_distance_km)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Error ending session", e))?;

        row.map(Session::try_from).transpose()
    }

    async fn list_for_driver(
        &self,
        driver_id: i32,
        status: Option<SessionStatus>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Session>> {
        let query = format!(
            r#"
            SELECT {} FROM sessions
            WHERE driver_id = $1
              AND ($2::VARCHAR IS NULL OR status = $2)
            ORDER BY start_time DESC
            OFFSET $3 LIMIT $4
            "#,
            SESSION_COLUMNS
        );

        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(driver_id)
            .bind(status.map(|s| s.as_str()))
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Session::try_from).collect()
    }
}

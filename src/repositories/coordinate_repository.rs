use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};

use crate::models::{Coordinate, NewCoordinate, StoredCoordinate};
use crate::repositories::CoordinateRepository;
use crate::utils::errors::{active_session_not_found, storage_error, AppResult};

pub struct PgCoordinateRepository {
    pool: PgPool,
}

impl PgCoordinateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, session_id: i32) {
    if let Err(e) = tx.rollback().await {
        error!("❌ Error revirtiendo lote de la sesión {}: {}", session_id, e);
    }
}

#[async_trait]
impl CoordinateRepository for PgCoordinateRepository {
    async fn insert_batch(&self, session_id: i32, rows: Vec<NewCoordinate>) -> AppResult<Vec<Coordinate>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Error opening transaction", e))?;

        // FOR SHARE bloquea el cierre de la sesión mientras el lote está en vuelo
        let locked: Result<Option<(i32,)>, sqlx::Error> = sqlx::query_as(
            "SELECT session_id FROM sessions WHERE session_id = $1 AND status = 'active' FOR SHARE",
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await;

        let active = match locked {
            Ok(active) => active,
            Err(e) => {
                rollback(tx, session_id).await;
                return Err(storage_error("Error locking session", e));
            }
        };

        if active.is_none() {
            rollback(tx, session_id).await;
            return Err(active_session_not_found(session_id));
        }

        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let inserted: Result<(i32,), sqlx::Error> = sqlx::query_as(
                r#"
                INSERT INTO coordinates (session_id, "timestamp", location, speed, altitude, accuracy, bearing)
                VALUES ($1, $2, ST_GeogFromText($3), $4, $5, $6, $7)
                RETURNING coord_id
                "#,
            )
            .bind(row.session_id)
            .bind(row.timestamp)
            .bind(row.location.to_ewkt())
            .bind(row.speed)
            .bind(row.altitude)
            .bind(row.accuracy)
            .bind(row.bearing)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok((coord_id,)) => created.push(row.into_coordinate(coord_id)),
                Err(e) => {
                    rollback(tx, session_id).await;
                    return Err(storage_error("Error inserting coordinate", e));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Error committing coordinates", e))?;

        info!("📍 {} coordenadas guardadas en la sesión {}", created.len(), session_id);
        Ok(created)
    }

    async fn list_for_session(&self, session_id: i32, skip: i64, limit: i64) -> AppResult<Vec<StoredCoordinate>> {
        let rows = sqlx::query_as::<_, StoredCoordinate>(
            r#"
            SELECT coord_id, session_id, "timestamp", ST_AsText(location) AS location_text,
                   speed, altitude, accuracy, bearing
            FROM coordinates
            WHERE session_id = $1
            ORDER BY "timestamp", coord_id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(session_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

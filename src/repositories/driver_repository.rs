use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::driver::{StoredContactInfo, StoredVehicleDetails};
use crate::models::{Driver, DriverProfile, DriverStatus};
use crate::repositories::DriverRepository;
use crate::utils::errors::{storage_error, AppError, AppResult};

const DRIVER_COLUMNS: &str = "driver_id, name, contact_info, vehicle_details, status, registration_date";

// Fila cruda: el JSONB puede venir de registros antiguos con forma laxa
#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    driver_id: i32,
    name: String,
    contact_info: Option<Json<serde_json::Value>>,
    vehicle_details: Option<Json<serde_json::Value>>,
    status: String,
    registration_date: DateTime<Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = AppError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<DriverStatus>().map_err(AppError::Internal)?;
        let contact_info = row.contact_info.map(|json| json.0).unwrap_or(serde_json::Value::Null);
        let vehicle_details = row.vehicle_details.map(|json| json.0).unwrap_or(serde_json::Value::Null);

        Ok(Driver {
            driver_id: row.driver_id,
            name: row.name,
            contact_info: StoredContactInfo::from_json(contact_info).into_contact_info(),
            vehicle_details: StoredVehicleDetails::from_json(vehicle_details).into_vehicle_details(),
            status,
            registration_date: row.registration_date,
        })
    }
}

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn create(&self, profile: &DriverProfile, registered_at: DateTime<Utc>) -> AppResult<Driver> {
        let query = format!(
            r#"
            INSERT INTO drivers (name, contact_info, vehicle_details, status, registration_date)
            VALUES ($1, $2, $3, 'active', $4)
            RETURNING {}
            "#,
            DRIVER_COLUMNS
        );

        let row = sqlx::query_as::<_, DriverRow>(&query)
            .bind(&profile.name)
            .bind(Json(&profile.contact_info))
            .bind(Json(&profile.vehicle_details))
            .bind(registered_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Error creating driver", e))?;

        Driver::try_from(row)
    }

    async fn find_by_id(&self, driver_id: i32) -> AppResult<Option<Driver>> {
        let query = format!("SELECT {} FROM drivers WHERE driver_id = $1", DRIVER_COLUMNS);

        let row = sqlx::query_as::<_, DriverRow>(&query)
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Driver::try_from).transpose()
    }

    async fn find_by_phone(&self, phone: &str, exclude_id: Option<i32>) -> AppResult<Option<Driver>> {
        let query = format!(
            r#"
            SELECT {} FROM drivers
            WHERE contact_info ->> 'phone' = $1
              AND ($2::INTEGER IS NULL OR driver_id <> $2)
            LIMIT 1
            "#,
            DRIVER_COLUMNS
        );

        let row = sqlx::query_as::<_, DriverRow>(&query)
            .bind(phone)
            .bind(exclude_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Driver::try_from).transpose()
    }

    async fn list(&self, status: Option<DriverStatus>, skip: i64, limit: i64) -> AppResult<(Vec<Driver>, i64)> {
        let status = status.map(|s| s.as_str());

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM drivers WHERE ($1::VARCHAR IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            r#"
            SELECT {} FROM drivers
            WHERE ($1::VARCHAR IS NULL OR status = $1)
            ORDER BY driver_id
            OFFSET $2 LIMIT $3
            "#,
            DRIVER_COLUMNS
        );

        let rows = sqlx::query_as::<_, DriverRow>(&query)
            .bind(status)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let drivers = rows
            .into_iter()
            .map(Driver::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((drivers, total))
    }

    async fn update_profile(&self, driver_id: i32, profile: &DriverProfile) -> AppResult<Option<Driver>> {
        let query = format!(
            r#"
            UPDATE drivers
            SET name = $2, contact_info = $3, vehicle_details = $4
            WHERE driver_id = $1
            RETURNING {}
            "#,
            DRIVER_COLUMNS
        );

        let row = sqlx::query_as::<_, DriverRow>(&query)
            .bind(driver_id)
            .bind(&profile.name)
            .bind(Json(&profile.contact_info))
            .bind(Json(&profile.vehicle_details))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Error updating driver", e))?;

        row.map(Driver::try_from).transpose()
    }

    async fn set_status(&self, driver_id: i32, status: DriverStatus) -> AppResult<Option<Driver>> {
        let query = format!(
            "UPDATE drivers SET status = $2 WHERE driver_id = $1 RETURNING {}",
            DRIVER_COLUMNS
        );

        let row = sqlx::query_as::<_, DriverRow>(&query)
            .bind(driver_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Error updating driver status", e))?;

        row.map(Driver::try_from).transpose()
    }

    async fn deactivate(&self, driver_id: i32) -> AppResult<bool> {
        let result = sqlx::query("UPDATE drivers SET status = 'inactive' WHERE driver_id = $1")
            .bind(driver_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Error deactivating driver", e))?;

        Ok(result.rows_affected() > 0)
    }
}

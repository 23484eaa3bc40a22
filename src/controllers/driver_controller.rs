use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::dto::driver_dto::{DriverFilters, PaginatedDriverResponse};
use crate::models::{Driver, DriverProfile, DriverStatus};
use crate::repositories::DriverRepository;
use crate::utils::errors::{bad_request_error, duplicate_phone_error, not_found_error, AppResult};
use crate::utils::validation::{page_count, page_number, validate_pagination};

pub struct DriverController {
    repository: Arc<dyn DriverRepository>,
}

impl DriverController {
    pub fn new(repository: Arc<dyn DriverRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, mut profile: DriverProfile) -> AppResult<Driver> {
        profile.normalize();
        profile.validate()?;

        // Comprobación rápida; el índice único tiene la última palabra
        if self
            .repository
            .find_by_phone(&profile.contact_info.phone, None)
            .await?
            .is_some()
        {
            return Err(duplicate_phone_error());
        }

        let driver = self.repository.create(&profile, Utc::now()).await?;
        info!("👤 Conductor {} registrado: {}", driver.driver_id, driver.name);
        Ok(driver)
    }

    pub async fn list(&self, filters: DriverFilters) -> AppResult<PaginatedDriverResponse> {
        let status = parse_status_filter(filters.status.as_deref())?;
        let (skip, limit) = validate_pagination(filters.skip, filters.limit)?;
        let (items, total) = self.repository.list(status, skip, limit).await?;

        Ok(PaginatedDriverResponse {
            total,
            items,
            page: page_number(skip, limit),
            pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, driver_id: i32) -> AppResult<Driver> {
        self.repository
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))
    }

    /// Reemplaza nombre, contacto y vehículo por completo
    pub async fn update(&self, driver_id: i32, mut profile: DriverProfile) -> AppResult<Driver> {
        profile.normalize();
        profile.validate()?;

        let existing = self.get(driver_id).await?;
        if existing.contact_info.phone != profile.contact_info.phone
            && self
                .repository
                .find_by_phone(&profile.contact_info.phone, Some(driver_id))
                .await?
                .is_some()
        {
            return Err(duplicate_phone_error());
        }

        let driver = self
            .repository
            .update_profile(driver_id, &profile)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        info!("✏️ Conductor {} actualizado", driver_id);
        Ok(driver)
    }

    pub async fn set_status(&self, driver_id: i32, status: DriverStatus) -> AppResult<Driver> {
        let driver = self
            .repository
            .set_status(driver_id, status)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        info!("🔄 Conductor {} ahora está {}", driver_id, status);
        Ok(driver)
    }

    /// Baja lógica: el conductor pasa a `inactive`
    pub async fn deactivate(&self, driver_id: i32) -> AppResult<()> {
        if !self.repository.deactivate(driver_id).await? {
            return Err(not_found_error("Driver", driver_id));
        }

        info!("🗑️ Conductor {} desactivado", driver_id);
        Ok(())
    }
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<DriverStatus>> {
    match status {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<DriverStatus>()
            .map(Some)
            .map_err(|_| bad_request_error("Status must be one of 'active', 'inactive' or 'suspended'")),
    }
}

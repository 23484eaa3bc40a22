//! Modelo de Driver
//!
//! Este módulo contiene el struct Driver, sus sub-objetos de contacto y
//! vehículo (columnas JSONB) y el shim de compatibilidad para registros
//! antiguos con una forma más laxa.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9]\d{9,14}$").unwrap();
}

/// Estado del conductor - mapea al CHECK valid_driver_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
    Suspended,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
            DriverStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(DriverStatus::Active),
            "inactive" => Ok(DriverStatus::Inactive),
            "suspended" => Ok(DriverStatus::Suspended),
            other => Err(format!("unknown driver status '{}'", other)),
        }
    }
}

/// Datos de contacto del conductor
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ContactInfo {
    #[validate(length(min = 8, max = 15), regex(path = "PHONE_REGEX", message = "Invalid phone number format"))]
    pub phone: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 5, max = 200))]
    pub address: String,

    pub emergency_contact: Option<String>,
}

/// Datos del vehículo del conductor
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct VehicleDetails {
    #[serde(rename = "type")]
    #[validate(length(min = 2, max = 50))]
    pub vehicle_type: String,

    #[validate(length(min = 2, max = 50))]
    pub make: String,

    #[validate(length(min = 2, max = 50))]
    pub model: String,

    pub year: i32,

    #[validate(length(min = 5, max = 20))]
    pub plate_number: String,

    pub color: Option<String>,
}

/// Nombre, contacto y vehículo: el bloque que se reemplaza entero en un update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct DriverProfile {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate]
    pub contact_info: ContactInfo,

    #[validate]
    pub vehicle_details: VehicleDetails,
}

impl DriverProfile {
    /// Quita espacios en los extremos antes de validar
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.name);

        let contact = &mut self.contact_info;
        trim_in_place(&mut contact.phone);
        trim_in_place(&mut contact.email);
        trim_in_place(&mut contact.address);

        let vehicle = &mut self.vehicle_details;
        trim_in_place(&mut vehicle.vehicle_type);
        trim_in_place(&mut vehicle.make);
        trim_in_place(&mut vehicle.model);
        trim_in_place(&mut vehicle.plate_number);
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Driver principal tal como se presenta en la API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub driver_id: i32,
    pub name: String,
    pub contact_info: ContactInfo,
    pub vehicle_details: VehicleDetails,
    pub status: DriverStatus,
    pub registration_date: DateTime<Utc>,
}

/// Contacto tal como puede estar guardado en registros antiguos
#[derive(Debug, Default)]
pub struct StoredContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Vehículo tal como puede estar guardado en registros antiguos.
///
/// Los registros más viejos usaban `plate` en lugar de `plate_number`.
#[derive(Debug, Default)]
pub struct StoredVehicleDetails {
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub plate: Option<String>,
    pub color: Option<String>,
}

/// Campo de texto de un JSONB laxo; los números se aceptan como texto
fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Año guardado como número o como texto numérico
fn year_field(value: &Value) -> Option<i32> {
    match value.get("year")? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|y| y.fract() == 0.0).map(|y| y as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

impl StoredContactInfo {
    /// Lee el JSONB almacenado campo a campo; lo que no encaja cuenta como ausente
    pub fn from_json(value: Value) -> Self {
        Self {
            phone: text_field(&value, "phone"),
            email: text_field(&value, "email"),
            address: text_field(&value, "address"),
            emergency_contact: text_field(&value, "emergency_contact"),
        }
    }

    pub fn into_contact_info(self) -> ContactInfo {
        ContactInfo {
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_else(|| "user@example.com".to_string()),
            address: self.address.unwrap_or_else(|| "Address not provided".to_string()),
            emergency_contact: self.emergency_contact,
        }
    }
}

impl StoredVehicleDetails {
    pub fn from_json(value: Value) -> Self {
        Self {
            vehicle_type: text_field(&value, "type"),
            make: text_field(&value, "make"),
            model: text_field(&value, "model"),
            year: year_field(&value),
            plate_number: text_field(&value, "plate_number"),
            plate: text_field(&value, "plate"),
            color: text_field(&value, "color"),
        }
    }

    pub fn into_vehicle_details(self) -> VehicleDetails {
        let plate_number = self
            .plate_number
            .filter(|plate| !plate.is_empty())
            .or(self.plate)
            .unwrap_or_default();

        VehicleDetails {
            vehicle_type: self.vehicle_type.unwrap_or_default(),
            make: self.make.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            year: self.year.unwrap_or(2000),
            plate_number,
            color: self.color,
        }
    }
}

//! Modelo de Session
//!
//! Una sesión de tracking pasa por `active -> completed` una sola vez y
//! nunca se reabre.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Estado de la sesión - mapea al CHECK valid_session_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// Session principal
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_distance_km: Option<Decimal>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Regla del CHECK valid_session_timeline
    pub fn timeline_is_valid(start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> bool {
        end_time.map_or(true, |end| end > start_time)
    }
}

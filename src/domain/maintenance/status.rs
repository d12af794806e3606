//! MaintenanceStatus enum for tracking the lifecycle of maintenance events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Lifecycle status of a maintenance event.
///
/// Any status may be set by an update; there is no transition table. What
/// matters to the rest of the system is whether a status is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Imminent,
    InProgress,
    Completed,
    Canceled,
}

/// Statuses that count toward the single-active-event rule.
pub const ACTIVE_STATUSES: [MaintenanceStatus; 2] =
    [MaintenanceStatus::Imminent, MaintenanceStatus::InProgress];

impl MaintenanceStatus {
    /// Returns true for `imminent` and `in_progress`.
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }

    /// Returns the wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Imminent => "imminent",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imminent" => Ok(MaintenanceStatus::Imminent),
            "in_progress" => Ok(MaintenanceStatus::InProgress),
            "completed" => Ok(MaintenanceStatus::Completed),
            "canceled" => Ok(MaintenanceStatus::Canceled),
            other => Err(ValidationError::invalid(
                "status",
                format!("\"{}\" is not a valid choice", other),
            )),
        }
    }
}

//! Strongly-typed identifier value objects.
//!
//! Identifiers are system-assigned integers, allocated by the store on insert.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered application/tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(i64);

impl ApplicationId {
    /// Creates an ApplicationId from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApplicationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a maintenance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaintenanceEventId(i64);

impl MaintenanceEventId {
    /// Creates a MaintenanceEventId from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MaintenanceEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MaintenanceEventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

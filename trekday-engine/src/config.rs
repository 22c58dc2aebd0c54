//! Itinerary configuration document.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Category, Day, DayNumber};
use crate::linkage::LinkDeclaration;

/// Everything needed to build an `Itinerary`, as loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryConfig {
    #[serde(default)]
    pub name: String,
    pub days: Vec<Day>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub links: Vec<LinkDeclaration>,
    /// Overall cap on selected days; absent means unbounded.
    #[serde(default)]
    pub max_selectable_days: Option<u32>,
}

impl ItineraryConfig {
    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate document-level invariants. Structural checks (duplicate ids,
    /// dangling references) happen when the catalog and linkage are built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::EmptyItinerary);
        }
        if let Some(max) = self.max_selectable_days
            && max == 0
        {
            return Err(ConfigError::MinViolation {
                field: "max_selectable_days",
                min: 1,
                value: max,
            });
        }
        for day in &self.days {
            if let Some(km) = day.distance_km
                && !(km.is_finite() && km >= 0.0)
            {
                return Err(ConfigError::InvalidMetric {
                    day: day.day_number,
                    field: "distance_km",
                    value: km,
                });
            }
        }
        Ok(())
    }
}

/// Errors raised when itinerary configuration invariants are violated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("itinerary has no days")]
    EmptyItinerary,
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("day {day}: {field} must be a non-negative number (got {value})")]
    InvalidMetric {
        day: DayNumber,
        field: &'static str,
        value: f32,
    },
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Incident report model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Incident report as stored in the hosted `incident_reports` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IncidentReport {
    /// Assigned by the persistence layer on create
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    /// Target city name (normally matches a city record)
    pub city: String,
    /// Incident date (YYYY-MM-DD)
    pub date: String,
    /// Incident time (HH:MM)
    #[serde(default)]
    pub time: String,
    /// Free-text location within the city
    #[serde(default)]
    pub location: String,
    pub severity: Severity,
    pub description: String,
    /// Server insert timestamp (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Report submission payload (no id yet).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewIncidentReport {
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    #[serde(default)]
    #[validate(custom(function = "validate_time"))]
    pub time: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
    #[serde(default)]
    pub severity: Severity,
    #[validate(length(min = 1, max = 2000, message = "description is required"))]
    pub description: String,
}

impl NewIncidentReport {
    /// Copy with surrounding whitespace stripped from every text field.
    pub fn trimmed(&self) -> Self {
        Self {
            city: self.city.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            location: self.location.trim().to_string(),
            severity: self.severity,
            description: self.description.trim().to_string(),
        }
    }
}

/// Incident date must be a calendar date (YYYY-MM-DD).
fn validate_date(date: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::new("date"))
}

/// Incident time is optional; when given it must be HH:MM.
fn validate_time(time: &str) -> Result<(), ValidationError> {
    if time.is_empty() {
        return Ok(());
    }
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| ValidationError::new("time"))
}

/// How serious an incident was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod city;
pub mod report;
pub mod stats;

pub use city::{BudgetLevel, City, CityUpdate, Coordinates, SafetyBand};
pub use report::{IncidentReport, NewIncidentReport, Severity};
pub use stats::SafetyStats;

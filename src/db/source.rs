// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data source interfaces.
//!
//! The city source is chosen once at startup (remote table store or the
//! embedded dataset); callers never branch on which one is active.

use crate::error::AppError;
use crate::models::{BudgetLevel, City, CityUpdate, IncidentReport, NewIncidentReport};
use async_trait::async_trait;
use serde::Serialize;

/// Where the active city records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Remote,
    Local,
}

impl DataSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSourceKind::Remote => "remote",
            DataSourceKind::Local => "local",
        }
    }
}

/// Server-side filter over score range, state and budget, with activities
/// matched client-side (OR semantics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    pub states: Vec<String>,
    pub min_safety_score: Option<u8>,
    pub max_safety_score: Option<u8>,
    pub budget_levels: Vec<BudgetLevel>,
    pub activities: Vec<String>,
}

impl SourceFilter {
    /// Whether a city passes the score, state and budget constraints.
    pub fn matches(&self, city: &City) -> bool {
        (self.states.is_empty() || self.states.contains(&city.state))
            && self.min_safety_score.is_none_or(|min| city.safety_score >= min)
            && self.max_safety_score.is_none_or(|max| city.safety_score <= max)
            && (self.budget_levels.is_empty() || self.budget_levels.contains(&city.budget_level))
            && (self.activities.is_empty() || self.activities.iter().any(|a| city.has_activity(a)))
    }
}

/// Read/write access to city records.
#[async_trait]
pub trait CitySource: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    /// All cities, in the order the source keeps them.
    async fn fetch_all(&self) -> Result<Vec<City>, AppError>;

    /// Substring search over city and state names.
    async fn search(&self, query: &str) -> Result<Vec<City>, AppError>;

    async fn filter(&self, filter: &SourceFilter) -> Result<Vec<City>, AppError>;

    /// Apply a partial update and return the full updated record.
    async fn update(&self, id: i64, update: &CityUpdate) -> Result<City, AppError>;
}

/// Incident report persistence.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    async fn create_report(&self, report: &NewIncidentReport) -> Result<IncidentReport, AppError>;

    /// Newest first, `limit` rows starting at `offset`.
    async fn list_reports(&self, limit: u32, offset: u32) -> Result<Vec<IncidentReport>, AppError>;

    async fn reports_for_city(&self, city: &str) -> Result<Vec<IncidentReport>, AppError>;

    /// Returns `false` when nothing was deleted (missing, or not the caller's).
    async fn delete_report(&self, id: i64) -> Result<bool, AppError>;

    async fn recent_reports(&self, limit: u32) -> Result<Vec<IncidentReport>, AppError> {
        self.list_reports(limit, 0).await
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the hosted table store (PostgREST-style REST API).
//!
//! Provides thin CRUD wrappers for:
//! - Cities (read, search, filter, update)
//! - Incident reports (create, list, delete)
//!
//! Without credentials every operation short-circuits to
//! [`AppError::NotConfigured`] without touching the network.

use crate::config::Config;
use crate::db::source::{CitySource, DataSourceKind, ReportGateway, SourceFilter};
use crate::db::tables;
use crate::error::AppError;
use crate::models::{City, CityUpdate, IncidentReport, NewIncidentReport};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Characters with meaning inside PostgREST filter expressions.
const RESERVED_FILTER_CHARS: [char; 6] = [',', '(', ')', '*', '"', '\\'];

/// Remote table store client.
#[derive(Clone)]
pub struct RemoteDb {
    client: Option<RemoteClient>,
}

#[derive(Clone)]
struct RemoteClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl RemoteDb {
    /// Create a client for the project at `base_url`.
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Gateway(format!("Failed to build HTTP client: {}", e)))?;

        let rest_url = format!("{}/rest/v1", base_url.trim_end_matches('/'));
        tracing::info!(url = %rest_url, "Remote table store configured");

        Ok(Self {
            client: Some(RemoteClient {
                http,
                rest_url,
                anon_key: anon_key.to_string(),
            }),
        })
    }

    /// Build from configuration, falling back to an offline client when the
    /// credentials are absent.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Self::new(url, key, config.remote_timeout),
            _ => {
                tracing::warn!("Remote table store not configured; using local data");
                Ok(Self::new_mock())
            }
        }
    }

    /// Create an offline client for testing.
    ///
    /// All operations will return `NotConfigured` if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&RemoteClient, AppError> {
        self.client.as_ref().ok_or(AppError::NotConfigured)
    }

    // ─── City Operations ─────────────────────────────────────────

    /// Get all cities, safest first.
    pub async fn get_all_cities(&self) -> Result<Vec<City>, AppError> {
        self.get_client()?
            .select(
                tables::CITIES,
                &[
                    ("select", "*".to_string()),
                    ("order", "safetyScore.desc".to_string()),
                ],
            )
            .await
    }

    /// Case-insensitive substring search over city and state.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<City>, AppError> {
        self.get_client()?
            .select(tables::CITIES, &search_params(query))
            .await
    }

    /// Filter cities by state, score range and budget. Activities are
    /// matched after the fetch.
    pub async fn filter_cities(&self, filter: &SourceFilter) -> Result<Vec<City>, AppError> {
        let mut cities: Vec<City> = self
            .get_client()?
            .select(tables::CITIES, &filter_params(filter))
            .await?;

        if !filter.activities.is_empty() {
            cities.retain(|c| filter.activities.iter().any(|a| c.has_activity(a)));
        }
        Ok(cities)
    }

    /// Update a city row and return the stored result.
    pub async fn update_city(&self, id: i64, update: &CityUpdate) -> Result<City, AppError> {
        let client = self.get_client()?;
        let response = client
            .request(reqwest::Method::PATCH, tables::CITIES)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let rows: Vec<City> = check_response_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", id)))
    }

    // ─── Incident Report Operations ──────────────────────────────

    /// Insert a report and return it with its assigned id.
    pub async fn create_report(
        &self,
        report: &NewIncidentReport,
    ) -> Result<IncidentReport, AppError> {
        let client = self.get_client()?;
        let response = client
            .request(reqwest::Method::POST, tables::INCIDENT_REPORTS)
            .header("Prefer", "return=representation")
            .json(report)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let rows: Vec<IncidentReport> = check_response_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Gateway("Insert returned no rows".to_string()))
    }

    /// Reports, newest first, with pagination.
    pub async fn list_reports(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<IncidentReport>, AppError> {
        self.get_client()?
            .select(
                tables::INCIDENT_REPORTS,
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await
    }

    /// Reports for one city, newest first.
    pub async fn reports_for_city(&self, city: &str) -> Result<Vec<IncidentReport>, AppError> {
        self.get_client()?
            .select(
                tables::INCIDENT_REPORTS,
                &[
                    ("select", "*".to_string()),
                    ("city", format!("eq.{}", city)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Delete a report. Row-level security only lets authors delete their
    /// own rows, so a foreign id deletes nothing.
    pub async fn delete_report(&self, id: i64) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let response = client
            .request(reqwest::Method::DELETE, tables::INCIDENT_REPORTS)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let rows: Vec<IncidentReport> = check_response_json(response).await?;
        Ok(!rows.is_empty())
    }
}

impl RemoteClient {
    /// Start an authenticated request against a table.
    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// GET rows from a table.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            tracing::warn!(status = status.as_u16(), "Remote store rejected credentials");
        }

        return Err(AppError::Gateway(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Gateway(format!("JSON parse error: {}", e)))
}

/// Strip characters that would change the meaning of a filter expression.
fn sanitize_filter_value(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !RESERVED_FILTER_CHARS.contains(c))
        .collect()
}

/// Query parameters for a city/state substring search.
fn search_params(query: &str) -> Vec<(&'static str, String)> {
    let needle = sanitize_filter_value(query);
    vec![
        ("select", "*".to_string()),
        (
            "or",
            format!("(city.ilike.*{0}*,state.ilike.*{0}*)", needle),
        ),
    ]
}

/// Query parameters for a server-side city filter.
fn filter_params(filter: &SourceFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];

    if !filter.states.is_empty() {
        let quoted: Vec<String> = filter
            .states
            .iter()
            .map(|s| format!("\"{}\"", sanitize_filter_value(s)))
            .collect();
        params.push(("state", format!("in.({})", quoted.join(","))));
    }
    if let Some(min) = filter.min_safety_score {
        params.push(("safetyScore", format!("gte.{}", min)));
    }
    if let Some(max) = filter.max_safety_score {
        params.push(("safetyScore", format!("lte.{}", max)));
    }
    if !filter.budget_levels.is_empty() {
        let levels: Vec<&str> = filter.budget_levels.iter().map(|b| b.as_str()).collect();
        params.push(("budgetLevel", format!("in.({})", levels.join(","))));
    }

    params
}

#[async_trait]
impl CitySource for RemoteDb {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<City>, AppError> {
        self.get_all_cities().await
    }

    async fn search(&self, query: &str) -> Result<Vec<City>, AppError> {
        self.search_cities(query).await
    }

    async fn filter(&self, filter: &SourceFilter) -> Result<Vec<City>, AppError> {
        self.filter_cities(filter).await
    }

    async fn update(&self, id: i64, update: &CityUpdate) -> Result<City, AppError> {
        self.update_city(id, update).await
    }
}

#[async_trait]
impl ReportGateway for RemoteDb {
    async fn create_report(&self, report: &NewIncidentReport) -> Result<IncidentReport, AppError> {
        RemoteDb::create_report(self, report).await
    }

    async fn list_reports(&self, limit: u32, offset: u32) -> Result<Vec<IncidentReport>, AppError> {
        RemoteDb::list_reports(self, limit, offset).await
    }

    async fn reports_for_city(&self, city: &str) -> Result<Vec<IncidentReport>, AppError> {
        RemoteDb::reports_for_city(self, city).await
    }

    async fn delete_report(&self, id: i64) -> Result<bool, AppError> {
        RemoteDb::delete_report(self, id).await
    }
}

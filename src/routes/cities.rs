// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City routes: dashboard queries, lookups, analytics and comparison.

use crate::db::{DataSourceKind, SourceFilter};
use crate::error::{AppError, Result};
use crate::models::{BudgetLevel, City, CityUpdate, SafetyBand, SafetyStats};
use crate::routes::split_list;
use crate::services::map::{self, MapMarker};
use crate::services::query::{self, CityFilters, CityQuery, FacetOptions, SortMode};
use crate::services::{CityComparison, CitySnapshot, CompareSelection};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_TOP_LIMIT: usize = 5;
const MAX_TOP_LIMIT: usize = 50;

/// City routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cities", get(list_cities))
        .route("/api/cities/refresh", post(refresh_cities))
        .route("/api/cities/top", get(top_cities))
        .route("/api/cities/search", get(search_cities))
        .route("/api/cities/filter", get(filter_cities))
        .route("/api/cities/{id}", get(get_city).patch(update_city))
        .route("/api/facets", get(get_facets))
        .route("/api/stats", get(get_stats))
        .route("/api/compare", get(compare_cities))
        .route("/api/map", get(get_map))
}

// ─── Dashboard Listing ───────────────────────────────────────

#[derive(Deserialize, Default)]
struct CitiesQuery {
    /// Search text (city or state)
    q: Option<String>,
    /// Comma-separated state names
    state: Option<String>,
    /// Comma-separated safety levels ("high", "Low (<70)", ...)
    safety: Option<String>,
    /// Comma-separated budget levels
    budget: Option<String>,
    /// Comma-separated activity tags
    activities: Option<String>,
    /// highest | lowest | budget | recommended
    sort: Option<String>,
}

impl CitiesQuery {
    fn to_query(&self) -> Result<CityQuery> {
        let safety_bands = split_list(self.safety.as_deref())
            .iter()
            .map(|s| s.parse::<SafetyBand>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let budgets = split_list(self.budget.as_deref())
            .iter()
            .map(|s| s.parse::<BudgetLevel>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let sort = match self.sort.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<SortMode>().map_err(AppError::BadRequest)?
            }
            _ => SortMode::default(),
        };

        Ok(CityQuery {
            search: self.q.clone().unwrap_or_default(),
            filters: CityFilters {
                states: split_list(self.state.as_deref()),
                safety_bands,
                budgets,
                activities: split_list(self.activities.as_deref()),
            },
            sort,
        })
    }
}

/// Dashboard listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CitiesResponse {
    pub cities: Vec<City>,
    pub total: u32,
    pub loading: bool,
    pub using_remote_source: bool,
    pub source: String,
    pub error: Option<String>,
}

impl CitiesResponse {
    fn from_snapshot(snapshot: CitySnapshot, cities: Vec<City>) -> Self {
        Self {
            total: cities.len() as u32,
            cities,
            loading: snapshot.loading,
            using_remote_source: snapshot.using_remote_source,
            source: snapshot.source.as_str().to_string(),
            error: snapshot.error,
        }
    }
}

/// Query the active dataset.
async fn list_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CitiesQuery>,
) -> Result<Json<CitiesResponse>> {
    let city_query = params.to_query()?;
    let snapshot = state.cities.snapshot().await;

    tracing::debug!(
        search = %city_query.search,
        sort = %city_query.sort,
        source = snapshot.source.as_str(),
        "Querying cities"
    );

    let cities = city_query.run(&snapshot.cities);
    Ok(Json(CitiesResponse::from_snapshot(snapshot, cities)))
}

/// Reload from the primary source (falls back to local data).
async fn refresh_cities(State(state): State<Arc<AppState>>) -> Json<CitiesResponse> {
    let snapshot = state.cities.refresh().await;
    let mut cities = snapshot.cities.clone();
    query::sort(&mut cities, SortMode::Highest);
    Json(CitiesResponse::from_snapshot(snapshot, cities))
}

// ─── Lookups ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct TopQuery {
    limit: Option<usize>,
}

async fn top_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopQuery>,
) -> Json<Vec<City>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT).min(MAX_TOP_LIMIT);
    let cities = state.cities.cities().await;
    Json(query::top_by_safety(&cities, limit))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Search through the data source directly (falls back to local data).
async fn search_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<City>> {
    Json(state.cities.search_source(&params.q).await)
}

#[derive(Deserialize)]
struct FilterQuery {
    states: Option<String>,
    min_score: Option<u8>,
    max_score: Option<u8>,
    budget: Option<String>,
    activities: Option<String>,
}

/// Filter through the data source directly (falls back to local data).
async fn filter_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<City>>> {
    if let (Some(min), Some(max)) = (params.min_score, params.max_score) {
        if min > max {
            return Err(AppError::BadRequest(
                "min_score must not exceed max_score".to_string(),
            ));
        }
    }

    let budget_levels = split_list(params.budget.as_deref())
        .iter()
        .map(|s| s.parse::<BudgetLevel>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let filter = SourceFilter {
        states: split_list(params.states.as_deref()),
        min_safety_score: params.min_score,
        max_safety_score: params.max_score,
        budget_levels,
        activities: split_list(params.activities.as_deref()),
    };

    Ok(Json(state.cities.filter_source(&filter).await))
}

async fn get_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<City>> {
    state
        .cities
        .city(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("City {} not found", id)))
}

/// Update a city through the remote store.
async fn update_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<CityUpdate>,
) -> Result<Json<City>> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    let out_of_range = update.out_of_range_scores();
    if !out_of_range.is_empty() {
        return Err(AppError::Validation(format!(
            "scores must be between 0 and 100: {}",
            out_of_range.join(", ")
        )));
    }

    tracing::info!(id, "Updating city");
    let city = state.cities.update_city(id, &update).await?;
    Ok(Json(city))
}

// ─── Analytics ───────────────────────────────────────────────

async fn get_facets(State(state): State<Arc<AppState>>) -> Json<FacetOptions> {
    let cities = state.cities.cities().await;
    Json(FacetOptions::from_cities(&cities))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<SafetyStats> {
    let cities = state.cities.cities().await;
    Json(SafetyStats::from_cities(&cities))
}

#[derive(Deserialize)]
struct CompareQuery {
    ids: String,
}

/// Compare exactly two cities from the active dataset.
async fn compare_cities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareQuery>,
) -> Result<Json<CityComparison>> {
    let ids = split_list(Some(&params.ids))
        .iter()
        .map(|s| s.parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| AppError::BadRequest("ids must be integers".to_string()))?;

    let [first_id, second_id] = ids[..] else {
        return Err(AppError::BadRequest(
            "Exactly two city ids are required".to_string(),
        ));
    };

    let mut selection = CompareSelection::new();
    for id in [first_id, second_id] {
        let city = state
            .cities
            .city(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", id)))?;
        selection.toggle(city);
    }

    // Toggling the same city twice leaves it unselected
    selection
        .comparison()
        .map(Json)
        .ok_or_else(|| AppError::BadRequest("Cannot compare a city with itself".to_string()))
}

/// Map response with the active data source.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapResponse {
    pub width: f64,
    pub height: f64,
    pub markers: Vec<MapMarker>,
    pub using_remote_source: bool,
}

async fn get_map(State(state): State<Arc<AppState>>) -> Json<MapResponse> {
    let snapshot = state.cities.snapshot().await;
    Json(MapResponse {
        width: map::MAP_WIDTH,
        height: map::MAP_HEIGHT,
        markers: map::markers(&snapshot.cities),
        using_remote_source: snapshot.source == DataSourceKind::Remote,
    })
}

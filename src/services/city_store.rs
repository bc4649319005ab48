// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City data reconciliation.
//!
//! Owns the active city set for the lifetime of the service. A load adopts
//! the primary source's records when it returns any, and the embedded
//! dataset otherwise; the two are never mixed. Row updates from the change
//! feed replace records by id.

use crate::db::{CitySource, DataSourceKind, SourceFilter, StaticDataset};
use crate::error::AppError;
use crate::models::{City, CityUpdate};
use crate::services::feed::ChangeEvent;
use crate::services::query;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const LOAD_FAILED_MESSAGE: &str = "Failed to load cities from database. Using local data.";

/// Read-only view of the store for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySnapshot {
    pub cities: Vec<City>,
    pub loading: bool,
    pub source: DataSourceKind,
    pub using_remote_source: bool,
    pub error: Option<String>,
}

struct StoreState {
    cities: Vec<City>,
    source: DataSourceKind,
    loading: bool,
    error: Option<String>,
}

/// Single-writer store of the active city set.
pub struct CityStore {
    source: Arc<dyn CitySource>,
    fallback: StaticDataset,
    state: RwLock<StoreState>,
    /// Token of the most recently issued load.
    latest_request: AtomicU64,
}

impl CityStore {
    /// Start with the embedded dataset active and a load pending.
    pub fn new(source: Arc<dyn CitySource>, fallback: StaticDataset) -> Self {
        let state = StoreState {
            cities: fallback.cities().to_vec(),
            source: DataSourceKind::Local,
            loading: true,
            error: None,
        };

        Self {
            source,
            fallback,
            state: RwLock::new(state),
            latest_request: AtomicU64::new(0),
        }
    }

    /// Fetch from the primary source and adopt the result, or fall back to
    /// the embedded dataset. Never fails.
    ///
    /// Returns the source that is active once this call settles. If a newer
    /// load was issued while this one was in flight, this result is
    /// discarded.
    pub async fn load(&self) -> DataSourceKind {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let (cities, source, error) = match self.source.fetch_all().await {
            Ok(cities) if !cities.is_empty() => (cities, self.source.kind(), None),
            Ok(_) => {
                tracing::info!("Primary source returned no cities; using local data");
                (self.fallback.cities().to_vec(), DataSourceKind::Local, None)
            }
            Err(AppError::NotConfigured) => {
                (self.fallback.cities().to_vec(), DataSourceKind::Local, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cities; using local data");
                (
                    self.fallback.cities().to_vec(),
                    DataSourceKind::Local,
                    Some(LOAD_FAILED_MESSAGE.to_string()),
                )
            }
        };

        let mut state = self.state.write().await;
        let latest = self.latest_request.load(Ordering::SeqCst);
        if token != latest {
            tracing::debug!(token, latest, "Discarding stale city load");
            return state.source;
        }

        tracing::info!(
            count = cities.len(),
            source = source.as_str(),
            "Active city dataset replaced"
        );
        state.cities = cities;
        state.source = source;
        state.error = error;
        state.loading = false;
        state.source
    }

    /// Re-run the load and return the resulting snapshot.
    pub async fn refresh(&self) -> CitySnapshot {
        self.load().await;
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> CitySnapshot {
        let state = self.state.read().await;
        CitySnapshot {
            cities: state.cities.clone(),
            loading: state.loading,
            source: state.source,
            using_remote_source: state.source == DataSourceKind::Remote,
            error: state.error.clone(),
        }
    }

    pub async fn cities(&self) -> Vec<City> {
        self.state.read().await.cities.clone()
    }

    pub async fn city(&self, id: i64) -> Option<City> {
        self.state
            .read()
            .await
            .cities
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub async fn source_kind(&self) -> DataSourceKind {
        self.state.read().await.source
    }

    /// Replace the record with the same id.
    ///
    /// Ignored when the id is not in the active set, or when the embedded
    /// dataset is active (remote rows never enter the local set). Returns
    /// whether a record was replaced.
    pub async fn apply_update(&self, city: City) -> bool {
        let mut state = self.state.write().await;
        if state.source != DataSourceKind::Remote {
            tracing::debug!(id = city.id, "Ignoring city update while local data is active");
            return false;
        }

        match state.cities.iter_mut().find(|c| c.id == city.id) {
            Some(slot) => {
                tracing::debug!(id = city.id, "Applied city update");
                *slot = city;
                true
            }
            None => {
                tracing::debug!(id = city.id, "Ignoring update for unknown city");
                false
            }
        }
    }

    /// Write an update through the primary source, then apply the stored
    /// record locally.
    pub async fn update_city(&self, id: i64, update: &CityUpdate) -> Result<City, AppError> {
        let city = self.source.update(id, update).await?;
        self.apply_update(city.clone()).await;
        Ok(city)
    }

    /// Search through the primary source, falling back to a local search of
    /// the embedded dataset on failure.
    pub async fn search_source(&self, q: &str) -> Vec<City> {
        if q.trim().is_empty() {
            return Vec::new();
        }
        match self.source.search(q).await {
            Ok(cities) => cities,
            Err(e) => {
                if !matches!(e, AppError::NotConfigured) {
                    tracing::warn!(error = %e, "Search failed; searching local data");
                }
                query::search(self.fallback.cities().to_vec(), q)
            }
        }
    }

    /// Filter through the primary source, falling back to the embedded
    /// dataset on failure.
    pub async fn filter_source(&self, filter: &SourceFilter) -> Vec<City> {
        match self.source.filter(filter).await {
            Ok(cities) => cities,
            Err(e) => {
                if !matches!(e, AppError::NotConfigured) {
                    tracing::warn!(error = %e, "Filter failed; filtering local data");
                }
                self.fallback
                    .cities()
                    .iter()
                    .filter(|c| filter.matches(c))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Apply city updates from the change feed until it closes.
    pub async fn run_feed(&self, mut rx: broadcast::Receiver<ChangeEvent>) {
        loop {
            match rx.recv().await {
                Ok(ChangeEvent::CityUpdated(city)) => {
                    self.apply_update(city).await;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "City feed lagged; reloading");
                    self.load().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Embedded fallback dataset.

use crate::db::source::{CitySource, DataSourceKind, SourceFilter};
use crate::error::AppError;
use crate::models::{City, CityUpdate};
use crate::services::query;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

const EMBEDDED_CITIES: &str = include_str!("../../data/cities.json");

/// Hand-authored city records used whenever the remote store is
/// unavailable or empty. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct StaticDataset {
    cities: Arc<Vec<City>>,
}

impl StaticDataset {
    /// Load the dataset compiled into the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::load_from_json(EMBEDDED_CITIES)
    }

    /// Load a dataset from a JSON array of city rows.
    pub fn load_from_json(json_data: &str) -> Result<Self, DatasetError> {
        let cities: Vec<City> =
            serde_json::from_str(json_data).map_err(|e| DatasetError::Parse(e.to_string()))?;
        Self::from_cities(cities)
    }

    pub fn from_cities(cities: Vec<City>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for city in &cities {
            if !seen.insert(city.id) {
                return Err(DatasetError::DuplicateId(city.id));
            }
        }

        tracing::debug!(count = cities.len(), "Loaded static city dataset");
        Ok(Self {
            cities: Arc::new(cities),
        })
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[async_trait]
impl CitySource for StaticDataset {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Local
    }

    async fn fetch_all(&self) -> Result<Vec<City>, AppError> {
        Ok(self.cities.to_vec())
    }

    async fn search(&self, query: &str) -> Result<Vec<City>, AppError> {
        Ok(query::search(self.cities.to_vec(), query))
    }

    async fn filter(&self, filter: &SourceFilter) -> Result<Vec<City>, AppError> {
        Ok(self
            .cities
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn update(&self, _id: i64, _update: &CityUpdate) -> Result<City, AppError> {
        Err(AppError::NotConfigured)
    }
}

/// Errors from loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to parse city dataset: {0}")]
    Parse(String),

    #[error("Duplicate city id in dataset: {0}")]
    DuplicateId(i64),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SafeCity Index: city safety scores and incident reports
//!
//! This crate provides the backend API behind the safety dashboard. It
//! reconciles the hosted city table with an embedded fallback dataset,
//! answers search/filter/sort queries over the active set and relays
//! anonymous incident reports.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{CitySource, ReportGateway, StaticDataset};
use services::{ChangeFeed, CityStore, ReportStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub cities: Arc<CityStore>,
    pub reports: Arc<ReportStore>,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn CitySource>,
        gateway: Arc<dyn ReportGateway>,
        fallback: StaticDataset,
    ) -> Self {
        let reports = Arc::new(ReportStore::new(gateway, config.recent_reports_limit));
        Self {
            cities: Arc::new(CityStore::new(source, fallback)),
            reports,
            feed: ChangeFeed::default(),
            config,
        }
    }
}

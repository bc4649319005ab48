// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process change feed.
//!
//! Row changes arrive through the database webhook and fan out to the
//! stores through a broadcast channel.

use crate::models::{City, IncidentReport};
use crate::services::{CityStore, ReportStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const DEFAULT_CAPACITY: usize = 256;

/// A row change relevant to the in-memory stores.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// A city row was updated; carries the full new record.
    CityUpdated(City),
    /// An incident report row was inserted.
    ReportInserted(IncidentReport),
}

/// Broadcast fan-out of change events.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Returns the number of listeners that will see it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

/// Handles for the background tasks pumping the feed into the stores.
pub struct FeedListeners {
    pub cities: JoinHandle<()>,
    pub reports: JoinHandle<()>,
}

impl FeedListeners {
    pub fn abort(&self) {
        self.cities.abort();
        self.reports.abort();
    }
}

/// Start one listener per store.
pub fn spawn_feed_listeners(
    feed: &ChangeFeed,
    cities: Arc<CityStore>,
    reports: Arc<ReportStore>,
) -> FeedListeners {
    let city_rx = feed.subscribe();
    let report_rx = feed.subscribe();

    FeedListeners {
        cities: tokio::spawn(async move { cities.run_feed(city_rx).await }),
        reports: tokio::spawn(async move { reports.run_feed(report_rx).await }),
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod city_store;
pub mod compare;
pub mod feed;
pub mod map;
pub mod query;
pub mod reports;

pub use city_store::{CitySnapshot, CityStore};
pub use compare::{CityComparison, CompareSelection};
pub use feed::{spawn_feed_listeners, ChangeEvent, ChangeFeed, FeedListeners};
pub use query::{CityFilters, CityQuery, FacetOptions, SortMode};
pub use reports::{ReportSnapshot, ReportStore, SubmitResult};

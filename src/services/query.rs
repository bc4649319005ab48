// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City query engine: search, facet filters and sorting.
//!
//! All functions are pure over their input. A full query runs
//! search → facet filters → sort. Facets combine with AND; values selected
//! within one facet combine with OR. An empty selection disables its facet.

use crate::models::{BudgetLevel, City, SafetyBand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Selected values for each facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityFilters {
    pub states: Vec<String>,
    pub safety_bands: Vec<SafetyBand>,
    pub budgets: Vec<BudgetLevel>,
    pub activities: Vec<String>,
}

impl CityFilters {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.safety_bands.is_empty()
            && self.budgets.is_empty()
            && self.activities.is_empty()
    }
}

/// Named result orderings.
///
/// Ties are not broken explicitly. The underlying sort is stable, so tied
/// cities keep the order in which they were passed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Safety score, descending
    #[default]
    Highest,
    /// Safety score, ascending
    Lowest,
    /// Budget level, Low < Medium < High
    Budget,
    /// Women-review score, descending
    Recommended,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Highest => "highest",
            SortMode::Lowest => "lowest",
            SortMode::Budget => "budget",
            SortMode::Recommended => "recommended",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highest" => Ok(SortMode::Highest),
            "lowest" => Ok(SortMode::Lowest),
            "budget" => Ok(SortMode::Budget),
            "recommended" => Ok(SortMode::Recommended),
            other => Err(format!("Unknown sort mode: {:?}", other)),
        }
    }
}

/// Case-insensitive substring match on city or state. A blank query keeps
/// every city.
pub fn search(mut cities: Vec<City>, query: &str) -> Vec<City> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return cities;
    }
    cities.retain(|c| {
        c.city.to_lowercase().contains(&needle) || c.state.to_lowercase().contains(&needle)
    });
    cities
}

pub fn filter_by_state(mut cities: Vec<City>, states: &[String]) -> Vec<City> {
    if !states.is_empty() {
        cities.retain(|c| states.contains(&c.state));
    }
    cities
}

/// Keep cities whose safety score lies in any of the selected bands.
pub fn filter_by_safety_band(mut cities: Vec<City>, bands: &[SafetyBand]) -> Vec<City> {
    if !bands.is_empty() {
        cities.retain(|c| bands.iter().any(|b| b.contains(c.safety_score)));
    }
    cities
}

pub fn filter_by_budget(mut cities: Vec<City>, budgets: &[BudgetLevel]) -> Vec<City> {
    if !budgets.is_empty() {
        cities.retain(|c| budgets.contains(&c.budget_level));
    }
    cities
}

/// Keep cities offering at least one of the selected activities.
pub fn filter_by_activity(mut cities: Vec<City>, activities: &[String]) -> Vec<City> {
    if !activities.is_empty() {
        cities.retain(|c| activities.iter().any(|a| c.has_activity(a)));
    }
    cities
}

/// Apply every facet in turn.
pub fn apply_filters(cities: Vec<City>, filters: &CityFilters) -> Vec<City> {
    let cities = filter_by_state(cities, &filters.states);
    let cities = filter_by_safety_band(cities, &filters.safety_bands);
    let cities = filter_by_budget(cities, &filters.budgets);
    filter_by_activity(cities, &filters.activities)
}

pub fn sort(cities: &mut [City], mode: SortMode) {
    match mode {
        SortMode::Highest => cities.sort_by(|a, b| b.safety_score.cmp(&a.safety_score)),
        SortMode::Lowest => cities.sort_by(|a, b| a.safety_score.cmp(&b.safety_score)),
        SortMode::Budget => {
            cities.sort_by(|a, b| a.budget_level.rank().cmp(&b.budget_level.rank()))
        }
        SortMode::Recommended => {
            cities.sort_by(|a, b| b.women_review_score.cmp(&a.women_review_score))
        }
    }
}

/// A complete dashboard query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityQuery {
    pub search: String,
    pub filters: CityFilters,
    pub sort: SortMode,
}

impl CityQuery {
    pub fn run(&self, cities: &[City]) -> Vec<City> {
        let matched = search(cities.to_vec(), &self.search);
        let mut result = apply_filters(matched, &self.filters);
        sort(&mut result, self.sort);
        result
    }
}

/// The `limit` safest cities.
pub fn top_by_safety(cities: &[City], limit: usize) -> Vec<City> {
    let mut sorted = cities.to_vec();
    sort(&mut sorted, SortMode::Highest);
    sorted.truncate(limit);
    sorted
}

/// Values available for each facet, for building filter panels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FacetOptions {
    pub states: Vec<String>,
    pub safety_levels: Vec<String>,
    pub budget_levels: Vec<String>,
    pub activities: Vec<String>,
}

impl FacetOptions {
    /// Distinct states and activities present in `cities` (sorted), plus the
    /// fixed band and budget labels.
    pub fn from_cities(cities: &[City]) -> Self {
        let states: BTreeSet<&str> = cities.iter().map(|c| c.state.as_str()).collect();
        let activities: BTreeSet<&str> = cities
            .iter()
            .flat_map(|c| c.activities.iter().map(String::as_str))
            .collect();

        Self {
            states: states.into_iter().map(String::from).collect(),
            safety_levels: SafetyBand::ALL
                .iter()
                .map(|b| b.label().to_string())
                .collect(),
            budget_levels: BudgetLevel::ALL
                .iter()
                .map(|b| b.as_str().to_string())
                .collect(),
            activities: activities.into_iter().map(String::from).collect(),
        }
    }
}

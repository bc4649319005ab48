// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Side-by-side city comparison.

use crate::models::City;
use serde::Serialize;
use std::collections::VecDeque;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A comparison always involves exactly this many cities.
pub const COMPARE_SIZE: usize = 2;

/// Outcome of toggling a city in the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle {
    Added,
    Removed,
    /// The selection was full; the oldest city made room.
    Replaced { evicted: City },
}

/// Cities picked for comparison, oldest first.
///
/// Holds at most [`COMPARE_SIZE`] cities. Adding a new city to a full
/// selection evicts the oldest one.
#[derive(Debug, Clone, Default)]
pub struct CompareSelection {
    selected: VecDeque<City>,
}

impl CompareSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, city: City) -> Toggle {
        if let Some(pos) = self.selected.iter().position(|c| c.id == city.id) {
            self.selected.remove(pos);
            return Toggle::Removed;
        }

        if self.selected.len() < COMPARE_SIZE {
            self.selected.push_back(city);
            return Toggle::Added;
        }

        let evicted = self.selected.pop_front();
        self.selected.push_back(city);
        match evicted {
            Some(evicted) => Toggle::Replaced { evicted },
            None => Toggle::Added,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.selected.iter().any(|c| c.id == id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &City> {
        self.selected.iter()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Comparison of the two selected cities, or `None` unless exactly two
    /// are selected.
    pub fn comparison(&self) -> Option<CityComparison> {
        match (self.selected.front(), self.selected.back()) {
            (Some(first), Some(second)) if self.selected.len() == COMPARE_SIZE => {
                Some(CityComparison::new(first.clone(), second.clone()))
            }
            _ => None,
        }
    }
}

/// One score compared across both cities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricComparison {
    pub category: String,
    pub first: u8,
    pub second: u8,
    /// Id of the higher-scoring city; `None` on a tie
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub leader: Option<i64>,
}

/// Two cities with their scores paired category by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComparison {
    pub first: City,
    pub second: City,
    pub metrics: Vec<MetricComparison>,
}

impl CityComparison {
    pub fn new(first: City, second: City) -> Self {
        let pairs = [
            ("Safety Score", first.safety_score, second.safety_score),
            ("Lighting", first.lighting_score, second.lighting_score),
            (
                "Transport",
                first.public_transport_score,
                second.public_transport_score,
            ),
            ("Crowd", first.crowd_score, second.crowd_score),
            ("Reviews", first.women_review_score, second.women_review_score),
        ];

        let metrics = pairs
            .into_iter()
            .map(|(category, a, b)| MetricComparison {
                category: category.to_string(),
                first: a,
                second: b,
                leader: match a.cmp(&b) {
                    std::cmp::Ordering::Greater => Some(first.id),
                    std::cmp::Ordering::Less => Some(second.id),
                    std::cmp::Ordering::Equal => None,
                },
            })
            .collect();

        Self {
            first,
            second,
            metrics,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Safety statistics aggregated over the active dataset.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{City, SafetyBand};

/// Dashboard summary counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SafetyStats {
    pub total_cities: u32,
    /// Mean safety score, rounded to the nearest integer (0 when empty)
    pub avg_safety_score: u32,
    pub high_safety: u32,
    pub moderate_safety: u32,
    pub low_safety: u32,
    pub unique_states: u32,
}

impl SafetyStats {
    pub fn from_cities(cities: &[City]) -> Self {
        let mut stats = Self {
            total_cities: cities.len() as u32,
            ..Default::default()
        };
        if cities.is_empty() {
            return stats;
        }

        let mut total: u64 = 0;
        let mut states = HashSet::new();

        for city in cities {
            total += u64::from(city.safety_score);
            states.insert(city.state.as_str());
            match city.safety_band() {
                SafetyBand::High => stats.high_safety += 1,
                SafetyBand::Moderate => stats.moderate_safety += 1,
                SafetyBand::Low => stats.low_safety += 1,
            }
        }

        stats.avg_safety_score = (total as f64 / cities.len() as f64).round() as u32;
        stats.unique_states = states.len() as u32;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetLevel, Coordinates};

    fn make_city(id: i64, state: &str, safety: u8) -> City {
        City {
            id,
            city: format!("City {}", id),
            state: state.to_string(),
            safety_score: safety,
            lighting_score: 70,
            public_transport_score: 70,
            crowd_score: 70,
            women_review_score: 70,
            budget_level: BudgetLevel::Medium,
            activities: vec![],
            coordinates: Coordinates { lat: 20.0, lng: 78.0 },
            alerts: vec![],
            pros: vec![],
            cons: vec![],
        }
    }

    #[test]
    fn test_stats_counts_bands_and_states() {
        let cities = vec![
            make_city(1, "Kerala", 85),
            make_city(2, "Kerala", 80),
            make_city(3, "Goa", 79),
            make_city(4, "Delhi", 62),
        ];

        let stats = SafetyStats::from_cities(&cities);

        assert_eq!(stats.total_cities, 4);
        assert_eq!(stats.high_safety, 2);
        assert_eq!(stats.moderate_safety, 1);
        assert_eq!(stats.low_safety, 1);
        assert_eq!(stats.unique_states, 3);
        // (85 + 80 + 79 + 62) / 4 = 76.5
        assert_eq!(stats.avg_safety_score, 77);
    }

    #[test]
    fn test_stats_empty_dataset() {
        let stats = SafetyStats::from_cities(&[]);
        assert_eq!(stats, SafetyStats::default());
    }
}

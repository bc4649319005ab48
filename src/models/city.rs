// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! City record model and its score classifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A city with its precomputed safety scores.
///
/// Field names follow the hosted `cities` table (camelCase). Records are
/// treated as immutable once fetched; an update replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct City {
    /// Stable identifier (unique within the active dataset)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    /// City name (e.g., "Bengaluru")
    pub city: String,
    /// State or union territory name
    pub state: String,
    pub safety_score: u8,
    pub lighting_score: u8,
    pub public_transport_score: u8,
    pub crowd_score: u8,
    pub women_review_score: u8,
    pub budget_level: BudgetLevel,
    #[serde(default)]
    pub activities: Vec<String>,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

impl City {
    /// Safety band derived from the safety score.
    pub fn safety_band(&self) -> SafetyBand {
        SafetyBand::from_score(self.safety_score)
    }

    /// Whether the city carries the given activity tag.
    pub fn has_activity(&self, tag: &str) -> bool {
        self.activities.iter().any(|a| a == tag)
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Relative cost of visiting a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

impl BudgetLevel {
    pub const ALL: [BudgetLevel; 3] = [BudgetLevel::Low, BudgetLevel::Medium, BudgetLevel::High];

    /// Position in the fixed Low < Medium < High order.
    pub fn rank(self) -> u8 {
        match self {
            BudgetLevel::Low => 1,
            BudgetLevel::Medium => 2,
            BudgetLevel::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetLevel::Low => "Low",
            BudgetLevel::Medium => "Medium",
            BudgetLevel::High => "High",
        }
    }
}

impl fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(BudgetLevel::Low),
            "medium" => Ok(BudgetLevel::Medium),
            "high" => Ok(BudgetLevel::High),
            _ => Err(ParseLevelError::new("budget level", s)),
        }
    }
}

/// Range classification of a safety score.
///
/// High = [80, 100], Moderate = [70, 80), Low = [0, 70). Every score falls
/// in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SafetyBand {
    High,
    Moderate,
    Low,
}

impl SafetyBand {
    pub const ALL: [SafetyBand; 3] = [SafetyBand::High, SafetyBand::Moderate, SafetyBand::Low];

    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            SafetyBand::High
        } else if score >= 70 {
            SafetyBand::Moderate
        } else {
            SafetyBand::Low
        }
    }

    pub fn contains(self, score: u8) -> bool {
        match self {
            SafetyBand::High => score >= 80,
            SafetyBand::Moderate => (70..80).contains(&score),
            SafetyBand::Low => score < 70,
        }
    }

    /// Filter panel label.
    pub fn label(self) -> &'static str {
        match self {
            SafetyBand::High => "High (80+)",
            SafetyBand::Moderate => "Moderate (70-79)",
            SafetyBand::Low => "Low (<70)",
        }
    }

    /// Marker color used by the map and score bars.
    pub fn color(self) -> &'static str {
        match self {
            SafetyBand::High => "#10b981",
            SafetyBand::Moderate => "#f59e0b",
            SafetyBand::Low => "#ef4444",
        }
    }
}

impl fmt::Display for SafetyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SafetyBand {
    type Err = ParseLevelError;

    /// Accepts both the panel labels ("High (80+)") and bare names ("high").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(band) = SafetyBand::ALL.into_iter().find(|b| b.label() == trimmed) {
            return Ok(band);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "high" => Ok(SafetyBand::High),
            "moderate" => Ok(SafetyBand::Moderate),
            "low" => Ok(SafetyBand::Low),
            _ => Err(ParseLevelError::new("safety level", s)),
        }
    }
}

/// Unrecognized level or band name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value:?}")]
pub struct ParseLevelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLevelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Partial update for a city row. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighting_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_transport_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crowd_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub women_review_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_level: Option<BudgetLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<Vec<String>>,
}

impl CityUpdate {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.safety_score.is_none()
            && self.lighting_score.is_none()
            && self.public_transport_score.is_none()
            && self.crowd_score.is_none()
            && self.women_review_score.is_none()
            && self.budget_level.is_none()
            && self.activities.is_none()
            && self.alerts.is_none()
            && self.pros.is_none()
            && self.cons.is_none()
    }

    /// Score fields that fall outside [0, 100].
    pub fn out_of_range_scores(&self) -> Vec<&'static str> {
        [
            ("safetyScore", self.safety_score),
            ("lightingScore", self.lighting_score),
            ("publicTransportScore", self.public_transport_score),
            ("crowdScore", self.crowd_score),
            ("womenReviewScore", self.women_review_score),
        ]
        .into_iter()
        .filter(|(_, score)| score.is_some_and(|s| s > 100))
        .map(|(name, _)| name)
        .collect()
    }
}

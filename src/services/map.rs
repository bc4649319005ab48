// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map markers for the safety heatmap.
//!
//! Uses a flat equirectangular projection of India's bounding box onto a
//! fixed canvas. Coordinates are only used for placement.

use crate::models::{City, Coordinates, SafetyBand};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const MAP_WIDTH: f64 = 1000.0;
pub const MAP_HEIGHT: f64 = 600.0;

const MIN_LAT: f64 = 8.0;
const MAX_LAT: f64 = 35.0;
const MIN_LNG: f64 = 68.0;
const MAX_LNG: f64 = 97.0;

/// A positioned city marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapMarker {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub city: String,
    pub state: String,
    pub x: f64,
    pub y: f64,
    pub safety_score: u8,
    pub band: SafetyBand,
    pub level: String,
    pub color: String,
}

/// Canvas position for a coordinate. North is up.
pub fn project(coordinates: Coordinates) -> (f64, f64) {
    let x = (coordinates.lng - MIN_LNG) / (MAX_LNG - MIN_LNG) * MAP_WIDTH;
    let y = (MAX_LAT - coordinates.lat) / (MAX_LAT - MIN_LAT) * MAP_HEIGHT;
    (x, y)
}

fn level_name(band: SafetyBand) -> &'static str {
    match band {
        SafetyBand::High => "High Safety",
        SafetyBand::Moderate => "Moderate Safety",
        SafetyBand::Low => "Low Safety",
    }
}

pub fn markers(cities: &[City]) -> Vec<MapMarker> {
    cities
        .iter()
        .map(|c| {
            let (x, y) = project(c.coordinates);
            let band = c.safety_band();
            MapMarker {
                id: c.id,
                city: c.city.clone(),
                state: c.state.clone(),
                x,
                y,
                safety_score: c.safety_score,
                band,
                level: level_name(band).to_string(),
                color: band.color().to_string(),
            }
        })
        .collect()
}

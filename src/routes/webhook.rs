// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database change webhook.
//!
//! The hosted database posts row changes here. Updated city rows and
//! inserted incident reports are relayed onto the change feed; everything
//! else is acknowledged and dropped.

use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{City, IncidentReport};
use crate::services::ChangeEvent;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/db", post(handle_change))
}

/// Row change payload.
#[derive(Deserialize, Debug)]
struct ChangePayload {
    #[serde(rename = "type")]
    change_type: String, // "INSERT", "UPDATE", "DELETE"
    table: String,
    #[serde(default)]
    record: Option<serde_json::Value>,
}

/// Check the shared secret header. An empty configured secret rejects all.
fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    headers
        .get(SECRET_HEADER)
        .map(|value| bool::from(value.as_bytes().ct_eq(secret.as_bytes())))
        .unwrap_or(false)
}

/// Handle a row change (POST).
async fn handle_change(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<StatusCode> {
    if !is_authorized(&headers, &state.config.webhook_secret) {
        tracing::warn!("Security Alert: Database webhook with missing or invalid secret");
        return Err(AppError::Unauthorized);
    }

    let change: ChangePayload = match serde_json::from_value(payload) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse database change");
            return Ok(StatusCode::OK); // Acknowledge so the sender does not retry
        }
    };

    tracing::debug!(
        change_type = %change.change_type,
        table = %change.table,
        "Database change received"
    );

    let event = match (change.table.as_str(), change.change_type.as_str()) {
        (tables::CITIES, "UPDATE") => {
            parse_record::<City>(change.record).map(ChangeEvent::CityUpdated)
        }
        (tables::INCIDENT_REPORTS, "INSERT") => {
            parse_record::<IncidentReport>(change.record).map(ChangeEvent::ReportInserted)
        }
        _ => None,
    };

    if let Some(event) = event {
        let receivers = state.feed.publish(event);
        tracing::debug!(receivers, "Published change event");
    }

    Ok(StatusCode::OK)
}

fn parse_record<T: serde::de::DeserializeOwned>(record: Option<serde_json::Value>) -> Option<T> {
    let record = record?;
    match serde_json::from_value(record) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse changed row");
            None
        }
    }
}

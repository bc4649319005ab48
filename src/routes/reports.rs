// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incident report routes.

use crate::error::{AppError, Result};
use crate::models::NewIncidentReport;
use crate::services::{ReportSnapshot, SubmitResult};
use crate::AppState;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Report routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports", get(list_reports).post(submit_report))
        .route("/api/reports/refresh", post(refresh_reports))
        .route("/api/reports/{id}", delete(delete_report))
}

#[derive(Deserialize)]
struct ReportsQuery {
    /// Restrict to one city (fetched directly, newest first)
    city: Option<String>,
}

/// Recent reports, or all reports for one city.
async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportsQuery>,
) -> Json<ReportSnapshot> {
    match params.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => Json(state.reports.for_city(city).await),
        _ => Json(state.reports.snapshot().await),
    }
}

/// Reload the recent reports from the remote store.
async fn refresh_reports(State(state): State<Arc<AppState>>) -> Json<ReportSnapshot> {
    Json(state.reports.refresh().await)
}

/// Submit an anonymous incident report.
async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(report): Json<NewIncidentReport>,
) -> Result<(StatusCode, Json<SubmitResult>)> {
    let result = state.reports.submit(report).await?;

    let status = if result.success {
        StatusCode::CREATED
    } else if result.not_configured {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    };

    Ok((status, Json(result)))
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

/// Delete a report. A row that was not deleted is a 404; a remote
/// failure keeps its own status (502/503).
async fn delete_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    if state.reports.delete(id).await? {
        tracing::info!(id, "Incident report deleted");
        Ok(Json(DeleteResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Report {} not deleted", id)))
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incident report store.
//!
//! Keeps the most recent reports in memory. Submissions are written
//! through the gateway and only reach the local list once the remote
//! create succeeds; a failed submission leaves the list untouched and is
//! not retried or saved anywhere else.

use crate::db::ReportGateway;
use crate::error::AppError;
use crate::models::{IncidentReport, NewIncidentReport};
use crate::services::feed::ChangeEvent;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use validator::Validate;

const LOAD_FAILED_MESSAGE: &str = "Failed to load incident reports";
const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit incident report";
const DELETE_FAILED_MESSAGE: &str = "Failed to delete incident report";

/// Read-only view of the report list.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub reports: Vec<IncidentReport>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Result of a submission, as shown by the report form.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<IncidentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure came from the remote store being unconfigured
    #[serde(skip)]
    pub not_configured: bool,
}

#[derive(Default)]
struct ReportState {
    reports: Vec<IncidentReport>,
    loading: bool,
    error: Option<String>,
}

/// Single-writer store of recent incident reports.
pub struct ReportStore {
    gateway: Arc<dyn ReportGateway>,
    recent_limit: u32,
    state: RwLock<ReportState>,
}

impl ReportStore {
    pub fn new(gateway: Arc<dyn ReportGateway>, recent_limit: u32) -> Self {
        Self {
            gateway,
            recent_limit,
            state: RwLock::new(ReportState::default()),
        }
    }

    pub async fn snapshot(&self) -> ReportSnapshot {
        let state = self.state.read().await;
        ReportSnapshot {
            reports: state.reports.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Reload the most recent reports. On failure the current list is kept
    /// and the error is recorded.
    pub async fn refresh(&self) -> ReportSnapshot {
        self.state.write().await.loading = true;

        let result = self.gateway.recent_reports(self.recent_limit).await;

        {
            let mut state = self.state.write().await;
            match result {
                Ok(reports) => {
                    tracing::debug!(count = reports.len(), "Loaded recent reports");
                    state.reports = reports;
                    state.error = None;
                }
                Err(AppError::NotConfigured) => {
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load incident reports");
                    state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                }
            }
            state.loading = false;
        }

        self.snapshot().await
    }

    /// Submit a report.
    ///
    /// Returns `Err` only for an invalid payload. Remote failures are
    /// reported through [`SubmitResult::success`].
    pub async fn submit(&self, report: NewIncidentReport) -> Result<SubmitResult, AppError> {
        let report = report.trimmed();
        report.validate()?;

        self.state.write().await.loading = true;
        let result = self.gateway.create_report(&report).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(created) => {
                tracing::info!(id = created.id, city = %created.city, "Incident report submitted");
                if !state.reports.iter().any(|r| r.id == created.id) {
                    state.reports.insert(0, created.clone());
                }
                state.error = None;
                Ok(SubmitResult {
                    success: true,
                    report: Some(created),
                    error: None,
                    not_configured: false,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, city = %report.city, "Failed to submit incident report");
                state.error = Some(SUBMIT_FAILED_MESSAGE.to_string());
                Ok(SubmitResult {
                    success: false,
                    report: None,
                    error: Some("Failed to submit report".to_string()),
                    not_configured: matches!(e, AppError::NotConfigured),
                })
            }
        }
    }

    /// Delete a report. Returns whether a row was deleted; a row that is
    /// missing or not owned by the caller gives `Ok(false)`.
    ///
    /// Gateway failures are recorded and returned.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.state.write().await.loading = true;
        let result = self.gateway.delete_report(id).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(true) => {
                state.reports.retain(|r| r.id != id);
                state.error = None;
                Ok(true)
            }
            Ok(false) => {
                tracing::info!(id, "Report not deleted (missing or not owned)");
                Ok(false)
            }
            Err(AppError::NotConfigured) => Err(AppError::NotConfigured),
            Err(e) => {
                tracing::warn!(error = %e, id, "Failed to delete incident report");
                state.error = Some(DELETE_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Prepend a report inserted elsewhere. Ignored if the id is already
    /// listed (e.g. our own submission echoed back by the feed).
    pub async fn apply_insert(&self, report: IncidentReport) -> bool {
        let mut state = self.state.write().await;
        if state.reports.iter().any(|r| r.id == report.id) {
            return false;
        }
        state.reports.insert(0, report);
        true
    }

    /// Reports for one city, newest first. Does not touch the store.
    pub async fn for_city(&self, city: &str) -> ReportSnapshot {
        match self.gateway.reports_for_city(city).await {
            Ok(reports) => ReportSnapshot {
                reports,
                loading: false,
                error: None,
            },
            Err(e) => {
                if !matches!(e, AppError::NotConfigured) {
                    tracing::warn!(error = %e, city, "Failed to load city reports");
                }
                ReportSnapshot {
                    reports: Vec::new(),
                    loading: false,
                    error: (!matches!(e, AppError::NotConfigured))
                        .then(|| "Failed to load city reports".to_string()),
                }
            }
        }
    }

    /// Prepend inserted reports from the change feed until it closes.
    pub async fn run_feed(&self, mut rx: broadcast::Receiver<ChangeEvent>) {
        loop {
            match rx.recv().await {
                Ok(ChangeEvent::ReportInserted(report)) => {
                    self.apply_insert(report).await;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Report feed lagged; reloading");
                    self.refresh().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use safecity_index::config::Config;
use safecity_index::db::{
    CitySource, DataSourceKind, RemoteDb, ReportGateway, SourceFilter, StaticDataset,
};
use safecity_index::error::AppError;
use safecity_index::models::{
    BudgetLevel, City, CityUpdate, Coordinates, IncidentReport, NewIncidentReport, Severity,
};
use safecity_index::routes::create_router;
use safecity_index::AppState;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Embedded dataset used as the fallback in every test.
#[allow(dead_code)]
pub fn fallback() -> StaticDataset {
    StaticDataset::embedded().expect("embedded dataset should parse")
}

/// Create a test app with offline dependencies (embedded dataset only).
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let dataset = fallback();
    create_test_app_with(Arc::new(dataset), Arc::new(RemoteDb::new_mock()))
}

/// Create a test app around the given source and gateway.
#[allow(dead_code)]
pub fn create_test_app_with(
    source: Arc<dyn CitySource>,
    gateway: Arc<dyn ReportGateway>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        source,
        gateway,
        fallback(),
    ));
    (create_router(state.clone()), state)
}

/// Build a city with uniform sub-scores.
#[allow(dead_code)]
pub fn make_city(id: i64, name: &str, state: &str, safety_score: u8) -> City {
    City {
        id,
        city: name.to_string(),
        state: state.to_string(),
        safety_score,
        lighting_score: safety_score,
        public_transport_score: safety_score,
        crowd_score: safety_score,
        women_review_score: safety_score,
        budget_level: BudgetLevel::Medium,
        activities: vec!["cafes".to_string()],
        coordinates: Coordinates {
            lat: 20.0,
            lng: 78.0,
        },
        alerts: Vec::new(),
        pros: Vec::new(),
        cons: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn make_submission(city: &str) -> NewIncidentReport {
    NewIncidentReport {
        city: city.to_string(),
        date: "2026-05-14".to_string(),
        time: "22:30".to_string(),
        location: "Railway station exit".to_string(),
        severity: Severity::High,
        description: "Group of men following women onto the platform".to_string(),
    }
}

#[allow(dead_code)]
pub fn make_report(id: i64, city: &str) -> IncidentReport {
    IncidentReport {
        id,
        city: city.to_string(),
        date: "2026-05-14".to_string(),
        time: "22:30".to_string(),
        location: "Market".to_string(),
        severity: Severity::Medium,
        description: "Poor lighting after shops close".to_string(),
        created_at: None,
    }
}

// ─── Fake City Sources ───────────────────────────────────────

/// Remote-like source with scripted rows.
#[allow(dead_code)]
pub struct FakeSource {
    rows: Mutex<Vec<City>>,
    fail: AtomicBool,
    pub fetches: AtomicUsize,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn with_rows(rows: Vec<City>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::with_rows(Vec::new())
    }

    pub fn failing() -> Arc<Self> {
        let source = Self::empty();
        source.set_failing(true);
        source
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_rows(&self, rows: Vec<City>) {
        *self.rows.lock().unwrap() = rows;
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AppError::Gateway("HTTP 500: boom".to_string()))
        } else {
            Ok(())
        }
    }

    fn rows(&self) -> Vec<City> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CitySource for FakeSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<City>, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.rows())
    }

    async fn search(&self, query: &str) -> Result<Vec<City>, AppError> {
        self.check()?;
        let q = query.to_lowercase();
        Ok(self
            .rows()
            .into_iter()
            .filter(|c| c.city.to_lowercase().contains(&q) || c.state.to_lowercase().contains(&q))
            .collect())
    }

    async fn filter(&self, filter: &SourceFilter) -> Result<Vec<City>, AppError> {
        self.check()?;
        Ok(self.rows().into_iter().filter(|c| filter.matches(c)).collect())
    }

    async fn update(&self, id: i64, update: &CityUpdate) -> Result<City, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let city = rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", id)))?;
        if let Some(score) = update.safety_score {
            city.safety_score = score;
        }
        if let Some(alerts) = &update.alerts {
            city.alerts = alerts.clone();
        }
        Ok(city.clone())
    }
}

/// Source whose first fetch blocks until released; later fetches return
/// immediately with different rows.
#[allow(dead_code)]
pub struct GatedSource {
    first: Vec<City>,
    later: Vec<City>,
    calls: AtomicUsize,
    pub started: Notify,
    pub release: Notify,
}

#[allow(dead_code)]
impl GatedSource {
    pub fn new(first: Vec<City>, later: Vec<City>) -> Arc<Self> {
        Arc::new(Self {
            first,
            later,
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl CitySource for GatedSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<City>, AppError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.first.clone())
        } else {
            Ok(self.later.clone())
        }
    }

    async fn search(&self, _query: &str) -> Result<Vec<City>, AppError> {
        Ok(Vec::new())
    }

    async fn filter(&self, _filter: &SourceFilter) -> Result<Vec<City>, AppError> {
        Ok(Vec::new())
    }

    async fn update(&self, _id: i64, _update: &CityUpdate) -> Result<City, AppError> {
        Err(AppError::NotConfigured)
    }
}

// ─── Fake Report Gateway ─────────────────────────────────────

/// In-memory report table, newest first.
#[allow(dead_code)]
pub struct FakeGateway {
    rows: Mutex<Vec<IncidentReport>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn with_rows(rows: Vec<IncidentReport>) -> Arc<Self> {
        let next_id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            rows: Mutex::new(rows),
            next_id: AtomicI64::new(next_id),
            fail: AtomicBool::new(false),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::with_rows(Vec::new())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AppError::Gateway("HTTP 503: unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReportGateway for FakeGateway {
    async fn create_report(&self, report: &NewIncidentReport) -> Result<IncidentReport, AppError> {
        self.check()?;
        let created = IncidentReport {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            city: report.city.clone(),
            date: report.date.clone(),
            time: report.time.clone(),
            location: report.location.clone(),
            severity: report.severity,
            description: report.description.clone(),
            created_at: Some("2026-05-14T22:31:00+00:00".to_string()),
        };
        self.rows.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn list_reports(&self, limit: u32, offset: u32) -> Result<Vec<IncidentReport>, AppError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn reports_for_city(&self, city: &str) -> Result<Vec<IncidentReport>, AppError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.city == city)
            .cloned()
            .collect())
    }

    async fn delete_report(&self, id: i64) -> Result<bool, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

// ─── HTTP Helpers ────────────────────────────────────────────

/// Send a request without a body.
#[allow(dead_code)]
pub async fn send(app: axum::Router, method: &str, uri: &str) -> axum::response::Response {
    use tower::ServiceExt;

    app.oneshot(
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a JSON request with optional extra headers.
#[allow(dead_code)]
pub async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    headers: &[(&str, &str)],
) -> axum::response::Response {
    use tower::ServiceExt;

    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    app.oneshot(
        builder
            .body(axum::body::Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

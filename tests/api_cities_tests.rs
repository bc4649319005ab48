// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City API endpoint tests on the embedded dataset.

use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{body_json, make_city, send, send_json, FakeSource};

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (app, _state) = common::create_test_app();
    let response = send(app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_list_defaults_to_highest_first() {
    let (app, state) = common::create_test_app();
    state.cities.load().await;

    let response = send(app, "GET", "/api/cities").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 24);
    assert_eq!(json["usingRemoteSource"], false);
    assert_eq!(json["source"], "local");
    assert_eq!(json["loading"], false);

    let scores: Vec<u64> = json["cities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["safetyScore"].as_u64().unwrap())
        .collect();
    assert_eq!(scores[0], 88);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_list_search_and_filters() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/cities?q=PRADESH&sort=lowest").await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["cities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["city"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Varanasi", "Lucknow", "Bhopal", "Manali", "Indore", "Shimla"]
    );

    let response = send(
        app.clone(),
        "GET",
        "/api/cities?safety=low&budget=medium",
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(ids(&json["cities"]), vec![18]);

    let response = send(app, "GET", "/api/cities?state=Kerala,Goa&activities=beaches").await;
    let json = body_json(response).await;
    assert_eq!(ids(&json["cities"]), vec![2, 22, 6]);
}

#[tokio::test]
async fn test_list_rejects_unknown_sort() {
    let (app, _state) = common::create_test_app();

    let response = send(app, "GET", "/api/cities?sort=alphabetical").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_city() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/cities/2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["city"], "Kochi");

    let response = send(app, "GET", "/api/cities/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top_cities() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/cities/top?limit=3").await;
    assert_eq!(ids(&body_json(response).await), vec![1, 2, 21]);

    let response = send(app, "GET", "/api/cities/top").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_search_endpoint_uses_local_fallback() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/cities/search?q=kerala").await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = send(app, "GET", "/api/cities/search?q=").await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_filter_endpoint() {
    let (app, _state) = common::create_test_app();

    let response = send(
        app.clone(),
        "GET",
        "/api/cities/filter?min_score=80&max_score=82&budget=low",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ids(&body_json(response).await), vec![13]);

    let response = send(app, "GET", "/api/cities/filter?min_score=90&max_score=10").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_facets_and_stats() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/facets").await;
    let facets = body_json(response).await;
    assert_eq!(facets["budgetLevels"], json!(["Low", "Medium", "High"]));
    assert_eq!(
        facets["safetyLevels"],
        json!(["High (80+)", "Moderate (70-79)", "Low (<70)"])
    );
    assert!(facets["states"]
        .as_array()
        .unwrap()
        .windows(2)
        .all(|w| w[0].as_str() < w[1].as_str()));

    let response = send(app, "GET", "/api/stats").await;
    let stats = body_json(response).await;
    assert_eq!(stats["totalCities"], 24);
    assert_eq!(stats["highSafety"], 11);
    assert_eq!(stats["moderateSafety"], 10);
    assert_eq!(stats["lowSafety"], 3);
}

#[tokio::test]
async fn test_compare() {
    let (app, _state) = common::create_test_app();

    let response = send(app.clone(), "GET", "/api/compare?ids=1,18").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["metrics"].as_array().unwrap().len(), 5);
    assert_eq!(json["metrics"][0]["category"], "Safety Score");
    assert_eq!(json["metrics"][0]["leader"], 1);

    let response = send(app.clone(), "GET", "/api/compare?ids=18,1").await;
    let json = body_json(response).await;
    assert_eq!(json["first"]["id"], 18);
    assert_eq!(json["second"]["id"], 1);
    assert_eq!(json["metrics"][0]["leader"], 1);

    let response = send(app.clone(), "GET", "/api/compare?ids=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(app.clone(), "GET", "/api/compare?ids=1,1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(app, "GET", "/api/compare?ids=1,999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_map_markers() {
    let (app, _state) = common::create_test_app();

    let response = send(app, "GET", "/api/map").await;
    let json = body_json(response).await;
    assert_eq!(json["markers"].as_array().unwrap().len(), 24);
    assert_eq!(json["usingRemoteSource"], false);
    assert_eq!(json["markers"][0]["color"], "#10b981");
}

#[tokio::test]
async fn test_patch_requires_remote_source() {
    let (app, _state) = common::create_test_app();

    let response = send_json(
        app,
        "PATCH",
        "/api/cities/1",
        &json!({"safetyScore": 50}),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_patch_validation() {
    let (app, _state) = common::create_test_app();

    let response = send_json(app.clone(), "PATCH", "/api/cities/1", &json!({}), &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_json(
        app,
        "PATCH",
        "/api/cities/1",
        &json!({"safetyScore": 140}),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_patch_updates_remote_city() {
    let source = FakeSource::with_rows(vec![make_city(101, "Shillong", "Meghalaya", 83)]);
    let (app, state) = common::create_test_app_with(source, common::FakeGateway::empty());
    state.cities.load().await;

    let response = send_json(
        app,
        "PATCH",
        "/api/cities/101",
        &json!({"safetyScore": 77}),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["safetyScore"], 77);
    assert_eq!(state.cities.city(101).await.unwrap().safety_score, 77);
}

#[tokio::test]
async fn test_refresh_reports_fallback_error() {
    let (app, _state) =
        common::create_test_app_with(FakeSource::failing(), common::FakeGateway::empty());

    let response = send(app, "POST", "/api/cities/refresh").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["usingRemoteSource"], false);
    assert_eq!(json["total"], 24);
    assert_eq!(
        json["error"],
        "Failed to load cities from database. Using local data."
    );
}

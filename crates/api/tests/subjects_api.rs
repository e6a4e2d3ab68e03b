//! Integration tests for per-subject listings, summary and chart data.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{body_json, get};
use rollcall_core::attendance::{build_log_at, NewAttendanceLog};
use rollcall_db::{AttendanceStore, MemoryAttendanceStore};
use serde_json::json;

/// Seed one log at the given day of January 2025 (noon UTC).
async fn seed(
    store: &MemoryAttendanceStore,
    module: &str,
    day: u32,
    detected: i64,
    expected: i64,
) {
    let input = NewAttendanceLog {
        classroom_id: "A101".into(),
        module_name: module.into(),
        lecture_name: format!("Lecture {day}"),
        num_students_detected: detected,
        total_students_expected: expected,
    };
    let at = Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap();
    store.append(&build_log_at(input, at)).await.unwrap();
}

async fn app_with_logs() -> axum::Router {
    let store = MemoryAttendanceStore::new();
    seed(&store, "Physics", 3, 18, 20).await;
    seed(&store, "Physics", 1, 0, 0).await;
    seed(&store, "Physics", 2, 15, 20).await;
    seed(&store, "Algebra", 2, 9, 10).await;
    common::build_app_with(Arc::new(store), Arc::new(common::FixedDetector(0)))
}

// ---------------------------------------------------------------------------
// Subjects and logs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subjects_are_distinct_and_sorted() {
    let response = get(app_with_logs().await, "/get_subjects").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(["Algebra", "Physics"]));
}

#[tokio::test]
async fn subject_logs_are_newest_first() {
    let json = body_json(get(app_with_logs().await, "/get_logs_by_subject/Physics").await).await;
    let lectures: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["lecture_name"].as_str().unwrap())
        .collect();

    assert_eq!(lectures, vec!["Lecture 3", "Lecture 2", "Lecture 1"]);
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_excludes_zero_expected_from_average_only() {
    let store = MemoryAttendanceStore::new();
    seed(&store, "Physics", 1, 18, 20).await;
    seed(&store, "Physics", 2, 0, 0).await;
    let app = common::build_app_with(Arc::new(store), Arc::new(common::FixedDetector(0)));

    let response = get(app, "/get_summary_by_subject/Physics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["subject"], "Physics");
    assert_eq!(json["average_attendance"], 90.0);
    assert_eq!(json["total_detected"], 18);
    assert_eq!(json["total_expected"], 20);
    assert_eq!(json["total_lectures"], 2);
}

#[tokio::test]
async fn summary_rounds_to_two_decimals() {
    let store = MemoryAttendanceStore::new();
    seed(&store, "Algebra", 1, 1, 3).await;
    let app = common::build_app_with(Arc::new(store), Arc::new(common::FixedDetector(0)));

    let json = body_json(get(app, "/get_summary_by_subject/Algebra").await).await;

    assert_eq!(json["average_attendance"], 33.33);
}

#[tokio::test]
async fn summary_for_unknown_subject_returns_404() {
    let response = get(app_with_logs().await, "/get_summary_by_subject/History").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chart_is_oldest_first_without_zero_expected_points() {
    let response = get(app_with_logs().await, "/get_chart_data_by_subject/Physics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([
            { "date": "2025-01-02", "attendance": 75.0 },
            { "date": "2025-01-03", "attendance": 90.0 },
        ])
    );
}

#[tokio::test]
async fn chart_for_unknown_subject_is_empty() {
    let response = get(app_with_logs().await, "/get_chart_data_by_subject/History").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

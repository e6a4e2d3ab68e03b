//! Integration tests for recording and listing attendance logs.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, post_json, post_raw};
use rollcall_db::MemoryAttendanceStore;
use serde_json::json;

fn lecture(classroom: &str, module: &str, detected: i64, expected: i64) -> serde_json::Value {
    json!({
        "classroom_id": classroom,
        "module_name": module,
        "lecture_name": "Week 1",
        "num_students_detected": detected,
        "total_students_expected": expected,
    })
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn log_attendance_returns_201_with_message() {
    let app = common::build_test_app();

    let response = post_json(app, "/log_attendance", lecture("A101", "Physics", 18, 20)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Attendance logged successfully");
}

#[tokio::test]
async fn logged_record_has_absent_count_and_timestamp() {
    let app = common::build_test_app();

    post_json(app.clone(), "/log_attendance", lecture("A101", "Physics", 18, 20)).await;
    let response = get(app, "/get_logs/A101").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let logs = json.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["absent_students"], 2);
    assert_eq!(logs[0]["module_name"], "Physics");
    assert!(logs[0]["timestamp"].is_string());
    assert!(logs[0].get("id").is_none());
}

#[tokio::test]
async fn over_detection_records_negative_absent() {
    let app = common::build_test_app();

    post_json(app.clone(), "/log_attendance", lecture("A101", "Physics", 25, 20)).await;
    let json = body_json(get(app, "/get_logs/A101").await).await;

    assert_eq!(json[0]["absent_students"], -5);
}

#[tokio::test]
async fn identical_submissions_are_both_kept() {
    let app = common::build_test_app();

    for _ in 0..2 {
        let response =
            post_json(app.clone(), "/log_attendance", lecture("B2", "Chemistry", 10, 12)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let json = body_json(get(app, "/get_logs/B2").await).await;

    assert_eq!(json.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn classroom_logs_are_newest_first_and_filtered() {
    let app = common::build_app_with(
        Arc::new(MemoryAttendanceStore::new()),
        Arc::new(common::FixedDetector(0)),
    );

    post_json(app.clone(), "/log_attendance", lecture("A101", "Physics", 1, 20)).await;
    post_json(app.clone(), "/log_attendance", lecture("C3", "Physics", 5, 20)).await;
    post_json(app.clone(), "/log_attendance", lecture("A101", "Physics", 2, 20)).await;

    let json = body_json(get(app, "/get_logs/A101").await).await;
    let detected: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["num_students_detected"].as_i64().unwrap())
        .collect();

    assert_eq!(detected, vec![2, 1]);
}

#[tokio::test]
async fn unknown_classroom_returns_empty_list() {
    let response = get(common::build_test_app(), "/get_logs/nowhere").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_field_returns_400() {
    let body = json!({
        "classroom_id": "A101",
        "module_name": "Physics",
        "num_students_detected": 3,
    });

    let response = post_json(common::build_test_app(), "/log_attendance", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let response = post_raw(
        common::build_test_app(),
        "/log_attendance",
        b"{not json".to_vec(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_count_is_rejected_and_not_stored() {
    let app = common::build_test_app();

    let response = post_json(app.clone(), "/log_attendance", lecture("A101", "Physics", -1, 20)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(body_json(get(app, "/get_logs/A101").await).await, json!([]));
}

#[tokio::test]
async fn huge_counts_are_rejected_so_summaries_cannot_overflow() {
    let app = common::build_test_app();

    for _ in 0..2 {
        let response = post_json(
            app.clone(),
            "/log_attendance",
            lecture("A101", "Physics", i64::MAX, i64::MAX),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = get(app, "/get_summary_by_subject/Physics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_classroom_is_rejected() {
    let response = post_json(
        common::build_test_app(),
        "/log_attendance",
        lecture("  ", "Physics", 3, 20),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

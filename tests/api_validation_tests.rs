// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_blank_email_rejected() {
    let app = common::create_test_app();
    let response = app
        .browser()
        .post(
            "/auth/signup",
            Some(json!({ "email": "   ", "password": "secret123" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_email_rejected_by_auth_service() {
    let app = common::create_test_app();
    let response = app.browser().sign_up("not-an-email", "secret123").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid email address");
}

#[tokio::test]
async fn test_unknown_wizard_field() {
    let app = common::create_test_app();
    let response = app
        .browser()
        .patch("/api/assessment/fields", json!({ "user_id": "someone-else" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_wizard_field() {
    let app = common::create_test_app();
    let response = app
        .browser()
        .patch(
            "/api/assessment/fields",
            json!({ "medical_conditions": "a".repeat(4001) }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_long_free_text_rejected_at_submit() {
    let app = common::create_test_app();
    let mut browser = app.browser();
    browser.sign_up("ana@example.com", "secret123").await;
    browser
        .patch(
            "/api/assessment/fields",
            json!({
                "age": "30",
                "weight": "80",
                "height": "175",
                "goal": "fitness",
                "activity_level": "sedentary",
                "medical_conditions": "a".repeat(2001),
                "training_experience": "beginner",
                "sleep_hours": "8"
            }),
        )
        .await;
    for _ in 0..3 {
        browser.post("/api/assessment/next", None).await;
    }

    let response = browser.post("/api/assessment/submit", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"][0]["field"], "medical_conditions");
}

#[tokio::test]
async fn test_unknown_training_day() {
    let app = common::create_test_app();
    let response = app
        .browser()
        .post("/api/assessment/days/Monday/toggle", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_plan_day() {
    let app = common::create_test_app();
    let response = app.browser().get("/api/plan/days/lunes").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = common::create_test_app();
    let response = app.browser().get("/api/plan").await;

    assert_eq!(
        response.headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers.get("cache-control").unwrap(), "no-store");
}

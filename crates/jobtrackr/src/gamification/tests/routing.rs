use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::gamification::domain::ApplicationStatus;
use crate::gamification::gamification_router;
use crate::gamification::router::summary_handler;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn award_then_list_points() {
    let (service, _activity, _store) = build_service();
    let app = gamification_router(Arc::new(service));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/user-42/points",
            json!({ "amount": 30, "reason": "profile_completed" }),
        ))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/user-42/points")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["total"], 30);
    assert_eq!(body["entries"][0]["reason"], "profile_completed");
}

#[tokio::test]
async fn invalid_goal_is_unprocessable() {
    let (service, _activity, _store) = build_service();
    let app = gamification_router(Arc::new(service));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users/user-42/goals",
            json!({ "goal_type": "applications_count", "period": "weekly", "target": 0 }),
        ))
        .await
        .expect("request handled");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("target"));
}

#[tokio::test]
async fn activity_endpoint_reports_new_badges() {
    let (service, activity, _store) = build_service();
    let now = at(2025, 5, 6, 10);
    activity.add_application(application(1, ApplicationStatus::Applied, now));
    let app = gamification_router(Arc::new(service));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users/user-42/activity",
            json!({ "kind": "application_created", "occurred_at": "2025-05-06T10:00:00Z" }),
        ))
        .await
        .expect("request handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["points_awarded"], 10);
    assert_eq!(body["new_badges"], json!(["first_application"]));
    assert_eq!(body["streak"]["current_streak"], 1);
}

#[tokio::test]
async fn badge_check_is_idempotent_over_http() {
    let (service, activity, _store) = build_service();
    activity.add_document(document(1, at(2025, 5, 6, 10)));
    let app = gamification_router(Arc::new(service));

    let check = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/users/user-42/badges/check")
            .body(Body::empty())
            .expect("request builds")
    };

    let first = read_json_body(app.clone().oneshot(check()).await.expect("handled")).await;
    let second = read_json_body(app.oneshot(check()).await.expect("handled")).await;

    assert_eq!(first["awarded"], json!(["first_document"]));
    assert_eq!(second["awarded"], json!([]));
}

#[tokio::test]
async fn streak_accepts_bodyless_post() {
    let (service, _activity, _store) = build_service();
    let app = gamification_router(Arc::new(service));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users/user-42/streak")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["current_streak"], 1);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users/user-99/streak",
            json!({ "activity_at": "2025-05-06T10:00:00Z" }),
        ))
        .await
        .expect("request handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["last_activity_at"], "2025-05-06T10:00:00Z");
}

#[tokio::test]
async fn summary_handler_returns_empty_profile() {
    let (service, _activity, _store) = build_service();

    let response = summary_handler::<MemoryActivity, MemoryStore>(
        State(Arc::new(service)),
        Path("user-42".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["user_id"], "user-42");
    assert_eq!(body["total_points"], 0);
    assert!(body["streak"].is_null());
}

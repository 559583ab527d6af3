use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ActivityKind, BadgeKind, NewGoal, PointEntry, UserId};
use super::repository::{ActivityRepository, GamificationRepository, RepositoryError};
use super::service::{GamificationError, GamificationService};

type SharedService<A, G> = Arc<GamificationService<A, G>>;

/// Router builder exposing the per-user gamification endpoints.
pub fn gamification_router<A, G>(service: SharedService<A, G>) -> Router
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/users/:user_id/gamification",
            get(summary_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/badges/check",
            post(check_badges_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/points",
            get(points_handler::<A, G>).post(award_points_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/streak",
            post(streak_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/goals",
            get(goals_handler::<A, G>).post(create_goal_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/goals/refresh",
            post(refresh_goals_handler::<A, G>),
        )
        .route(
            "/api/v1/users/:user_id/activity",
            post(activity_handler::<A, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct AwardPointsRequest {
    pub amount: i64,
    pub reason: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreakRequest {
    #[serde(default)]
    pub activity_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub kind: ActivityKind,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BadgeCheckResponse {
    pub awarded: Vec<BadgeKind>,
}

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub total: i64,
    pub entries: Vec<PointEntry>,
}

fn error_response(error: GamificationError) -> Response {
    let status = match &error {
        GamificationError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GamificationError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        GamificationError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        GamificationError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, GamificationError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    respond(StatusCode::OK, service.summary(&UserId(user_id)))
}

pub(crate) async fn check_badges_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    let result = service
        .check_badges(&UserId(user_id), Utc::now())
        .map(|awarded| BadgeCheckResponse { awarded });
    respond(StatusCode::OK, result)
}

pub(crate) async fn points_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    let user_id = UserId(user_id);
    let result = service.point_history(&user_id).map(|entries| PointsResponse {
        total: entries.iter().map(|entry| entry.amount).sum(),
        entries,
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn award_points_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<AwardPointsRequest>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    let result = service.award_points(
        &UserId(user_id),
        request.amount,
        &request.reason,
        request.metadata,
        Utc::now(),
    );
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn streak_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
    request: Option<axum::Json<StreakRequest>>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    let activity_at = request
        .and_then(|axum::Json(request)| request.activity_at)
        .unwrap_or_else(Utc::now);
    respond(
        StatusCode::OK,
        service.update_streak(&UserId(user_id), activity_at),
    )
}

pub(crate) async fn goals_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    respond(StatusCode::OK, service.goals(&UserId(user_id)))
}

pub(crate) async fn create_goal_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<NewGoal>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_goal(&UserId(user_id), request, Utc::now()),
    )
}

pub(crate) async fn refresh_goals_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_goals(&UserId(user_id), Utc::now()),
    )
}

pub(crate) async fn activity_handler<A, G>(
    State(service): State<SharedService<A, G>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<ActivityRequest>,
) -> Response
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    let occurred_at = request.occurred_at.unwrap_or_else(Utc::now);
    respond(
        StatusCode::OK,
        service.record_activity(&UserId(user_id), request.kind, occurred_at),
    )
}

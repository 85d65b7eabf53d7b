use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    config::Config,
    db::Stores,
    error::ServiceError,
    services::{
        auth_service::init_auth, leaderboard_service::LeaderboardService,
        score_service::ScoreService,
    },
};

pub mod auth;
pub mod leaderboard;
pub mod scores;

/// Failure body of the auth and score routes.
#[derive(Serialize, ToSchema)]
pub struct OkFailure {
    pub ok: bool,
    pub error: String,
}

/// Failure body of the leaderboard routes.
#[derive(Serialize, ToSchema)]
pub struct SuccessFailure {
    pub success: bool,
    pub error: String,
}

pub fn ok_failure(err: ServiceError) -> Response {
    err.log();
    let status: StatusCode = err.status();
    (status, Json(OkFailure { ok: false, error: err.to_string() })).into_response()
}

pub fn success_failure(err: ServiceError) -> Response {
    err.log();
    let status: StatusCode = err.status();
    (status, Json(SuccessFailure { success: false, error: err.to_string() })).into_response()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}

pub fn init_routes(config: Arc<Config>, stores: Stores) -> Router {
    let auth = init_auth(&config, stores.users.clone());
    let score_service = Arc::new(ScoreService::new(stores.scores.clone(), config.default_quiz.clone()));
    let leaderboard_service = Arc::new(LeaderboardService::new(stores.scores.clone(), config.leaderboard_limit));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::auth_routes(auth.clone()))
        .merge(scores::score_routes(score_service, auth.clone()))
        .merge(leaderboard::leaderboard_routes(leaderboard_service, auth))
}

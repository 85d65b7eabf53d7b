use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    response::Response,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::middleware::auth::auth_middleware;
use crate::models::{score::ScoreSummary, user::Identity};
use crate::routes::{ok_failure, OkFailure};
use crate::services::{auth_service::SharedAuth, score_service::{ScoreService, ScoreSubmission}};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SubmitScoreResponse {
    pub ok: bool,
    pub best: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MyScoresResponse {
    pub ok: bool,
    pub scores: Vec<ScoreSummary>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MyScoreResponse {
    pub ok: bool,
    pub score: ScoreSummary,
}

#[utoipa::path(
    post,
    path = "/submit-score",
    request_body = ScoreSubmission,
    responses(
        (status = 200, description = "Best score after this submission", body = SubmitScoreResponse),
        (status = 400, description = "Invalid score or quiz", body = OkFailure),
        (status = 401, description = "Unauthorized", body = OkFailure),
        (status = 500, description = "Store unavailable, retry later", body = OkFailure)
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_score(
    State(score_service): State<Arc<ScoreService>>,
    Extension(identity): Extension<Arc<Identity>>,
    req: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<Json<SubmitScoreResponse>, Response> {
    let Json(submission) = req.map_err(|_| ok_failure(ServiceError::invalid("Malformed request body")))?;

    let stored = score_service
        .submit(&identity, &submission)
        .await
        .map_err(ok_failure)?;

    Ok(Json(SubmitScoreResponse { ok: true, best: stored.score }))
}

#[utoipa::path(
    get,
    path = "/scores/me",
    responses(
        (status = 200, description = "Caller's best score on every quiz", body = MyScoresResponse),
        (status = 401, description = "Unauthorized", body = OkFailure)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_scores(
    State(score_service): State<Arc<ScoreService>>,
    Extension(identity): Extension<Arc<Identity>>,
) -> Result<Json<MyScoresResponse>, Response> {
    let records = score_service.scores_for(&identity.id).await.map_err(ok_failure)?;

    Ok(Json(MyScoresResponse {
        ok: true,
        scores: records.iter().map(ScoreSummary::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/scores/me/{quiz_id}",
    params(
        ("quiz_id" = String, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Caller's best score on the quiz", body = MyScoreResponse),
        (status = 401, description = "Unauthorized", body = OkFailure),
        (status = 404, description = "No score recorded yet", body = OkFailure)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_score(
    State(score_service): State<Arc<ScoreService>>,
    Extension(identity): Extension<Arc<Identity>>,
    Path(quiz_id): Path<String>,
) -> Result<Json<MyScoreResponse>, Response> {
    let record = score_service.best(&identity.id, quiz_id.trim()).await.map_err(ok_failure)?;

    Ok(Json(MyScoreResponse {
        ok: true,
        score: ScoreSummary::from(&record),
    }))
}

pub fn score_routes(score_service: Arc<ScoreService>, auth: SharedAuth) -> Router {
    Router::new()
        .route("/submit-score", axum::routing::post(submit_score))
        .route("/scores/me", axum::routing::get(my_scores))
        .route("/scores/me/{quiz_id}", axum::routing::get(my_score))
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(score_service)
}

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    response::Response,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::ServiceError;
use crate::middleware::auth::optional_identity;
use crate::models::{leaderboard::LeaderboardEntry, score::ScoreSummary};
use crate::routes::{success_failure, SuccessFailure};
use crate::services::{auth_service::SharedAuth, leaderboard_service::LeaderboardService};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Page size, at least 1.
    limit: Option<usize>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub success: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_score: Option<ScoreSummary>,
}

#[utoipa::path(
    get,
    path = "/leaderboard/{quiz_id}",
    params(
        ("quiz_id" = String, Path, description = "Quiz ID, or `overall` for the sum of per-quiz bests"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Ranked leaderboard", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit", body = SuccessFailure),
        (status = 500, description = "Store unavailable, retry later", body = SuccessFailure)
    )
)]
pub async fn get_leaderboard(
    State((leaderboard_service, auth)): State<(Arc<LeaderboardService>, SharedAuth)>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<LeaderboardResponse>, Response> {
    let Query(query) = query.map_err(|_| success_failure(ServiceError::invalid("limit must be a positive integer")))?;

    let viewer = optional_identity(&auth, &headers).await;
    if viewer.is_none() {
        tracing::debug!(quiz = %quiz_id, "anonymous leaderboard read");
    }

    let board = leaderboard_service
        .get_leaderboard(quiz_id.trim(), query.limit, viewer.as_ref().map(|v| v.id.as_str()))
        .await
        .map_err(success_failure)?;

    Ok(Json(LeaderboardResponse {
        success: true,
        leaderboard: board.entries,
        user_rank: board.viewer_rank,
        user_score: board.viewer_score,
    }))
}

pub fn leaderboard_routes(leaderboard_service: Arc<LeaderboardService>, auth: SharedAuth) -> Router {
    Router::new()
        .route("/leaderboard/{quiz_id}", axum::routing::get(get_leaderboard))
        .with_state((leaderboard_service, auth))
}

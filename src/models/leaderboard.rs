use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::score::{ScoreRecord, ScoreSummary};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<i64>,
}

impl LeaderboardEntry {
    pub fn from_record(rank: usize, record: &ScoreRecord) -> Self {
        LeaderboardEntry {
            rank,
            username: record.username.clone(),
            score: record.score,
            total_questions: record.total_questions,
            percentage: record.percentage(),
            completion_time: record.completion_time_seconds,
        }
    }
}

/// A ranked page plus, when the viewer is ranked below the page, their own position.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub viewer_rank: Option<usize>,
    pub viewer_score: Option<ScoreSummary>,
}

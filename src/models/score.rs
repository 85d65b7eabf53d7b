use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quiz id of the aggregate leaderboard. Scores cannot be submitted to it.
pub const OVERALL_QUIZ: &str = "overall";

/// Best known score of one user on one quiz.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub quiz_id: String,
    pub username: String,
    pub score: i64,
    pub total_questions: Option<i64>,
    pub completion_time_seconds: Option<i64>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(
        user_id: impl Into<String>,
        quiz_id: impl Into<String>,
        username: impl Into<String>,
        score: i64,
    ) -> Self {
        let now = Utc::now();
        ScoreRecord {
            id: None,
            user_id: user_id.into(),
            quiz_id: quiz_id.into(),
            username: username.into(),
            score,
            total_questions: None,
            completion_time_seconds: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_total_questions(mut self, total: Option<i64>) -> Self {
        self.total_questions = total;
        self
    }

    pub fn with_completion_time(mut self, seconds: Option<i64>) -> Self {
        self.completion_time_seconds = seconds;
        self
    }

    /// `score / total_questions * 100`, rounded. `None` without a usable total.
    pub fn percentage(&self) -> Option<i64> {
        match self.total_questions {
            Some(total) if total > 0 => Some((self.score as f64 * 100.0 / total as f64).round() as i64),
            _ => None,
        }
    }
}

/// Wire view of a single record, used for `userScore` and `/scores/me`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub quiz: String,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<i64>,
}

impl From<&ScoreRecord> for ScoreSummary {
    fn from(r: &ScoreRecord) -> Self {
        ScoreSummary {
            quiz: r.quiz_id.clone(),
            score: r.score,
            total_questions: r.total_questions,
            percentage: r.percentage(),
            completion_time: r.completion_time_seconds,
        }
    }
}

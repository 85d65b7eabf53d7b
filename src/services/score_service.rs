use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::db::ScoreStore;
use crate::error::ServiceError;
use crate::models::score::{ScoreRecord, OVERALL_QUIZ};
use crate::models::user::Identity;

const MAX_QUIZ_ID_LEN: usize = 64;

/// Body of `POST /submit-score`. Numeric fields stay raw JSON so a string or
/// negative value is reported as invalid input rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    #[serde(default)]
    #[schema(value_type = i64, minimum = 0)]
    pub score: Value,
    pub quiz: Option<String>,
    #[schema(value_type = Option<i64>, minimum = 1)]
    pub total_questions: Option<Value>,
    #[serde(alias = "completionTimeSeconds")]
    #[schema(value_type = Option<i64>, minimum = 0)]
    pub completion_time: Option<Value>,
}

impl ScoreSubmission {
    pub fn new(score: impl Into<Value>) -> Self {
        ScoreSubmission {
            score: score.into(),
            ..Default::default()
        }
    }

    pub fn for_quiz(mut self, quiz: &str) -> Self {
        self.quiz = Some(quiz.to_string());
        self
    }
}

fn non_negative_integer(field: &str, value: &Value) -> Result<i64, ServiceError> {
    value
        .as_u64()
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| ServiceError::invalid(format!("{field} must be a non-negative integer")))
}

pub fn parse_score(value: &Value) -> Result<i64, ServiceError> {
    non_negative_integer("score", value)
}

/// Trims the quiz id and falls back to `default_quiz` when empty.
pub fn resolve_quiz_id(quiz: Option<&str>, default_quiz: &str) -> Result<String, ServiceError> {
    let quiz = quiz.map(str::trim).filter(|q| !q.is_empty()).unwrap_or(default_quiz);
    if quiz.eq_ignore_ascii_case(OVERALL_QUIZ) {
        return Err(ServiceError::invalid("Scores cannot be submitted to the overall leaderboard"));
    }
    if quiz.len() > MAX_QUIZ_ID_LEN
        || !quiz.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ServiceError::invalid(
            "quiz must be up to 64 letters, digits, '-' or '_'",
        ));
    }
    Ok(quiz.to_string())
}

pub struct ScoreService {
    store: Arc<dyn ScoreStore>,
    default_quiz: String,
}

impl ScoreService {
    pub fn new(store: Arc<dyn ScoreStore>, default_quiz: String) -> Self {
        Self { store, default_quiz }
    }

    /// Validates the submission and keeps the higher of it and the stored best.
    /// Nothing is written when validation fails.
    pub async fn submit(&self, identity: &Identity, submission: &ScoreSubmission) -> Result<ScoreRecord, ServiceError> {
        let score = parse_score(&submission.score)?;
        let quiz_id = resolve_quiz_id(submission.quiz.as_deref(), &self.default_quiz)?;

        let total_questions = submission
            .total_questions
            .as_ref()
            .map(|v| non_negative_integer("totalQuestions", v))
            .transpose()?;
        if let Some(total) = total_questions {
            if total == 0 || score > total {
                return Err(ServiceError::invalid(
                    "totalQuestions must be at least 1 and not below score",
                ));
            }
        }
        let completion_time = submission
            .completion_time
            .as_ref()
            .map(|v| non_negative_integer("completionTime", v))
            .transpose()?;

        let candidate = ScoreRecord::new(identity.id.as_str(), quiz_id.as_str(), identity.name.as_str(), score)
            .with_total_questions(total_questions)
            .with_completion_time(completion_time);

        let stored = self.store.upsert_best(candidate).await?;
        if stored.score > score {
            tracing::debug!(user_id = %identity.id, quiz = %quiz_id, score, best = stored.score, "score below best, kept existing");
        } else {
            tracing::info!(user_id = %identity.id, quiz = %quiz_id, best = stored.score, "best score recorded");
        }
        Ok(stored)
    }

    pub async fn best(&self, user_id: &str, quiz_id: &str) -> Result<ScoreRecord, ServiceError> {
        self.store.find(user_id, quiz_id).await?.ok_or(ServiceError::NotFound)
    }

    /// The caller's best score on every quiz they have played.
    pub async fn scores_for(&self, user_id: &str) -> Result<Vec<ScoreRecord>, ServiceError> {
        Ok(self.store.list_by_user(user_id).await?)
    }
}

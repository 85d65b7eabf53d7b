use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use crate::db::ScoreStore;
use crate::error::ServiceError;
use crate::models::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::models::score::{ScoreRecord, ScoreSummary, OVERALL_QUIZ};

pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
    default_limit: usize,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn ScoreStore>, default_limit: usize) -> Self {
        Self { store, default_limit }
    }

    pub async fn get_leaderboard(
        &self,
        quiz_id: &str,
        limit: Option<usize>,
        viewer_id: Option<&str>,
    ) -> Result<Leaderboard, ServiceError> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(ServiceError::invalid("limit must be at least 1"));
        }

        let records = if quiz_id == OVERALL_QUIZ {
            aggregate_overall(self.store.list_all().await?)
        } else {
            self.store.list_by_quiz(quiz_id).await?
        };

        Ok(rank_records(records, limit, viewer_id))
    }
}

/// Records with a time sort before records without one; faster first.
fn compare_completion(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Highest score first, then fastest completion. The sort is stable, so
/// full ties keep store (insertion) order.
pub fn sort_records(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| compare_completion(a.completion_time_seconds, b.completion_time_seconds))
    });
}

/// Sorts the whole set, numbers it 1..n and keeps the first `limit`
/// entries. The viewer's position is reported only when it falls outside
/// the page.
pub fn rank_records(mut records: Vec<ScoreRecord>, limit: usize, viewer_id: Option<&str>) -> Leaderboard {
    sort_records(&mut records);

    let viewer = viewer_id.and_then(|id| {
        records
            .iter()
            .position(|r| r.user_id == id)
            .map(|i| (i + 1, &records[i]))
    });
    let (viewer_rank, viewer_score) = match viewer {
        Some((rank, record)) if rank > limit => (Some(rank), Some(ScoreSummary::from(record))),
        _ => (None, None),
    };

    let entries = records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, record)| LeaderboardEntry::from_record(i + 1, record))
        .collect();

    Leaderboard {
        entries,
        viewer_rank,
        viewer_score,
    }
}

fn sum_if_both(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    Some(a?.saturating_add(b?))
}

/// One row per user: the sum of their per-quiz bests. Question totals and
/// completion times are summed only while every contributing record has one.
/// Sums saturate at `i64::MAX`.
pub fn aggregate_overall(records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    let mut totals: Vec<ScoreRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        if record.quiz_id == OVERALL_QUIZ {
            continue;
        }
        match index.get(&record.user_id) {
            Some(&i) => {
                let total = &mut totals[i];
                total.score = total.score.saturating_add(record.score);
                total.total_questions = sum_if_both(total.total_questions, record.total_questions);
                total.completion_time_seconds =
                    sum_if_both(total.completion_time_seconds, record.completion_time_seconds);
                if record.updated_at > total.updated_at {
                    total.username = record.username;
                    total.updated_at = record.updated_at;
                }
                total.created_at = total.created_at.min(record.created_at);
            }
            None => {
                index.insert(record.user_id.clone(), totals.len());
                totals.push(ScoreRecord {
                    id: None,
                    quiz_id: OVERALL_QUIZ.to_string(),
                    ..record
                });
            }
        }
    }

    totals
}

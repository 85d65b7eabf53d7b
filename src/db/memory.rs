use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{ScoreStore, UserStore};
use crate::error::StoreError;
use crate::models::{score::ScoreRecord, user::User};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Records are kept in insertion order; the compare-and-set in
/// `upsert_best` runs under a single lock.
#[derive(Default)]
pub struct MemoryScoreStore {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryScoreStore {
    fn filtered<P>(&self, keep: P) -> Result<Vec<ScoreRecord>, StoreError>
    where
        P: Fn(&ScoreRecord) -> bool,
    {
        Ok(lock(&self.records)?.iter().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn find(&self, user_id: &str, quiz_id: &str) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|r| r.user_id == user_id && r.quiz_id == quiz_id)
            .cloned())
    }

    async fn upsert_best(&self, candidate: ScoreRecord) -> Result<ScoreRecord, StoreError> {
        let mut records = lock(&self.records)?;
        let position = records
            .iter()
            .position(|r| r.user_id == candidate.user_id && r.quiz_id == candidate.quiz_id);

        let Some(i) = position else {
            records.push(candidate.clone());
            return Ok(candidate);
        };

        let stored = &mut records[i];
        if stored.score < candidate.score {
            stored.username = candidate.username;
            stored.score = candidate.score;
            stored.total_questions = candidate.total_questions;
            stored.completion_time_seconds = candidate.completion_time_seconds;
            stored.updated_at = Utc::now();
        }
        Ok(stored.clone())
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> Result<Vec<ScoreRecord>, StoreError> {
        self.filtered(|r| r.quiz_id == quiz_id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScoreRecord>, StoreError> {
        self.filtered(|r| r.user_id == user_id)
    }

    async fn list_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.filtered(|_| true)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        users.push(user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.iter().find(|u| u.id == id).cloned())
    }
}

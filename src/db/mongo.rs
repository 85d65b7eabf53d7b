use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};

use crate::db::{ScoreStore, UserStore};
use crate::error::StoreError;
use crate::models::{score::ScoreRecord, user::User};

const DUPLICATE_KEY: i32 = 11000;

pub async fn connect(uri: &str, database: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database(database))
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn optional(value: Option<i64>) -> Bson {
    value.map(Bson::Int64).unwrap_or(Bson::Null)
}

/// Matches the candidate's key only while the stored score is strictly lower.
pub(crate) fn lower_score_filter(candidate: &ScoreRecord) -> Document {
    doc! {
        "user_id": candidate.user_id.as_str(),
        "quiz_id": candidate.quiz_id.as_str(),
        "score": { "$lt": candidate.score },
    }
}

pub(crate) fn best_score_update(candidate: &ScoreRecord, now: bson::DateTime) -> Document {
    doc! {
        "$set": {
            "username": candidate.username.as_str(),
            "score": candidate.score,
            "total_questions": optional(candidate.total_questions),
            "completion_time_seconds": optional(candidate.completion_time_seconds),
            "updated_at": now,
        },
        "$setOnInsert": { "created_at": now },
    }
}

pub struct MongoScoreStore {
    collection: Collection<ScoreRecord>,
}

impl MongoScoreStore {
    pub async fn new(db: &Database) -> Result<Self, StoreError> {
        let collection: Collection<ScoreRecord> = db.collection("scores");
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index).await?;
        Ok(Self { collection })
    }

    async fn replace_if_lower(&self, filter: Document, update: Document, upsert: bool) -> mongodb::error::Result<Option<ScoreRecord>> {
        self.collection
            .find_one_and_update(filter, update)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .await
    }

    async fn list(&self, filter: Document) -> Result<Vec<ScoreRecord>, StoreError> {
        let cursor = self.collection.find(filter).sort(doc! { "_id": 1 }).await?;
        let records: Vec<ScoreRecord> = cursor.try_collect().await?;
        Ok(records)
    }
}

#[async_trait]
impl ScoreStore for MongoScoreStore {
    async fn find(&self, user_id: &str, quiz_id: &str) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! { "user_id": user_id, "quiz_id": quiz_id })
            .await?)
    }

    async fn upsert_best(&self, candidate: ScoreRecord) -> Result<ScoreRecord, StoreError> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let filter = lower_score_filter(&candidate);
        let update = best_score_update(&candidate, now);

        match self.replace_if_lower(filter.clone(), update.clone(), true).await {
            Ok(Some(stored)) => return Ok(stored),
            Ok(None) => {}
            // The key exists with a score >= candidate, or a concurrent insert won.
            // Retry as a plain conditional update so a higher candidate still lands.
            Err(e) if is_duplicate_key(&e) => {
                if let Some(stored) = self.replace_if_lower(filter, update, false).await? {
                    return Ok(stored);
                }
            }
            Err(e) => return Err(e.into()),
        }

        self.find(&candidate.user_id, &candidate.quiz_id)
            .await?
            .ok_or_else(|| StoreError::Unavailable("score record vanished after upsert".to_string()))
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> Result<Vec<ScoreRecord>, StoreError> {
        self.list(doc! { "quiz_id": quiz_id }).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScoreRecord>, StoreError> {
        self.list(doc! { "user_id": user_id }).await
    }

    async fn list_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.list(doc! {}).await
    }
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub async fn new(db: &Database) -> Result<Self, StoreError> {
        let collection: Collection<User> = db.collection("users");
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }
}

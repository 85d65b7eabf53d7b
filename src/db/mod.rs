use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::error::StoreError;
use crate::models::{score::ScoreRecord, user::User};

pub mod memory;
pub mod mongo;

/// Persistence of best scores, keyed by `(user_id, quiz_id)`.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn find(&self, user_id: &str, quiz_id: &str) -> Result<Option<ScoreRecord>, StoreError>;

    /// Stores `candidate` only if no record exists for its key or the stored
    /// score is strictly lower, atomically. Returns the record stored afterwards.
    async fn upsert_best(&self, candidate: ScoreRecord) -> Result<ScoreRecord, StoreError>;

    /// All records of a quiz, in insertion order.
    async fn list_by_quiz(&self, quiz_id: &str) -> Result<Vec<ScoreRecord>, StoreError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScoreRecord>, StoreError>;

    /// Every record, in insertion order.
    async fn list_all(&self) -> Result<Vec<ScoreRecord>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct Stores {
    pub scores: Arc<dyn ScoreStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            scores: Arc::new(memory::MemoryScoreStore::default()),
            users: Arc::new(memory::MemoryUserStore::default()),
        }
    }
}

pub async fn init_db(config: &Config) -> Result<Stores, StoreError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, data will not survive a restart");
            Ok(Stores::in_memory())
        }
        StoreBackend::Mongo => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| StoreError::Unavailable("MONGODB_URI not configured".to_string()))?;
            let db = mongo::connect(uri, &config.database_name).await?;
            let scores = mongo::MongoScoreStore::new(&db).await?;
            let users = mongo::MongoUserStore::new(&db).await?;
            tracing::info!(database = %config.database_name, "connected to MongoDB");
            Ok(Stores {
                scores: Arc::new(scores),
                users: Arc::new(users),
            })
        }
    }
}

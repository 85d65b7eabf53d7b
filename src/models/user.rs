use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account stored by the local auth backend.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// An authenticated principal, as resolved from a bearer token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, ToSchema)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<User> for Identity {
    fn from(u: User) -> Self {
        Identity {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

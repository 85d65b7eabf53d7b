use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthBackend {
    Local {
        jwt_secret: String,
        token_ttl_hours: i64,
    },
    Hosted {
        url: String,
        anon_key: String,
        service_key: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub mongodb_uri: Option<String>,
    pub database_name: String,
    pub auth: AuthBackend,
    pub default_quiz: String,
    pub leaderboard_limit: usize,
}

impl Config {
    /// Shuttle secrets first, then the process environment (`.env` included).
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store = match get("STORE_BACKEND").as_deref() {
            None | Some("mongo") => StoreBackend::Mongo,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { key: "STORE_BACKEND", value: other.to_string() })
            }
        };

        let mongodb_uri = get("MONGODB_URI");
        if store == StoreBackend::Mongo && mongodb_uri.is_none() {
            return Err(ConfigError::Missing("MONGODB_URI"));
        }

        let auth = match get("AUTH_BACKEND").as_deref() {
            None | Some("local") => AuthBackend::Local {
                jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
                token_ttl_hours: parse_or("JWT_TTL_HOURS", get("JWT_TTL_HOURS"), 24)?,
            },
            Some("hosted") => AuthBackend::Hosted {
                url: get("AUTH_URL")
                    .ok_or(ConfigError::Missing("AUTH_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                anon_key: get("AUTH_ANON_KEY").ok_or(ConfigError::Missing("AUTH_ANON_KEY"))?,
                service_key: get("AUTH_SERVICE_ROLE_KEY")
                    .ok_or(ConfigError::Missing("AUTH_SERVICE_ROLE_KEY"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid { key: "AUTH_BACKEND", value: other.to_string() })
            }
        };

        let leaderboard_limit: usize = parse_or("LEADERBOARD_LIMIT", get("LEADERBOARD_LIMIT"), 50)?;
        if leaderboard_limit == 0 {
            return Err(ConfigError::Invalid { key: "LEADERBOARD_LIMIT", value: "0".to_string() });
        }

        Ok(Config {
            store,
            mongodb_uri,
            database_name: get("MONGODB_DATABASE").unwrap_or_else(|| "quiz_db".to_string()),
            auth,
            default_quiz: get("DEFAULT_QUIZ").unwrap_or_else(|| "bimo".to_string()),
            leaderboard_limit,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

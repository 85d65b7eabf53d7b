use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::config::{AuthBackend, Config};
use crate::db::UserStore;
use crate::error::{ServiceError, StoreError};
use crate::models::user::{Identity, User};
use crate::services::hosted_auth::HostedAuth;
use crate::utils::{generate_jwt, hash_password, normalize_email, validate_jwt, verify_password};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Signup input after trimming and email normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    pub fn validate(name: &str, email: &str, password: &str) -> Result<Self, ServiceError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ServiceError::invalid("Missing fields"));
        }
        if !email.contains('@') {
            return Err(ServiceError::invalid("Please enter a valid email address."));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        Ok(NewAccount {
            name: name.to_string(),
            email,
            password: password.to_string(),
        })
    }
}

/// Signup, login and bearer-token resolution.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn signup(&self, account: NewAccount) -> Result<(), ServiceError>;

    /// Returns an access token for the account.
    async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError>;

    async fn resolve(&self, token: &str) -> Result<Identity, ServiceError>;
}

pub type SharedAuth = Arc<dyn AuthProvider>;

pub fn init_auth(config: &Config, users: Arc<dyn UserStore>) -> SharedAuth {
    match &config.auth {
        AuthBackend::Local { jwt_secret, token_ttl_hours } => {
            Arc::new(LocalAuth::new(users, jwt_secret.clone(), *token_ttl_hours))
        }
        AuthBackend::Hosted { url, anon_key, service_key } => {
            Arc::new(HostedAuth::new(url.clone(), anon_key.clone(), service_key.clone()))
        }
    }
}

/// Accounts in our own user store, argon2 hashes, HS256 tokens.
pub struct LocalAuth {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl LocalAuth {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl_hours,
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn signup(&self, account: NewAccount) -> Result<(), ServiceError> {
        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(ServiceError::invalid("An account with that email already exists."));
        }

        let password_hash = hash_password(&account.password)
            .map_err(|e| StoreError::Unavailable(format!("password hashing failed: {e}")))?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: account.name,
            email: account.email,
            password_hash,
            created_at: Utc::now(),
        };
        let user_id = user.id.clone();

        match self.users.insert(user).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "account created");
                Ok(())
            }
            Err(StoreError::Conflict) => {
                Err(ServiceError::invalid("An account with that email already exists."))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::invalid("Please enter your email and password."));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(&user.password_hash, password) {
            return Err(ServiceError::InvalidCredentials);
        }

        let identity: Identity = user.into();
        let token = generate_jwt(&identity, &self.jwt_secret, self.token_ttl_hours)
            .map_err(|e| StoreError::Unavailable(format!("token signing failed: {e}")))?;
        tracing::info!(user_id = %identity.id, "login succeeded");
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Identity, ServiceError> {
        let claims = validate_jwt(token, &self.jwt_secret).ok_or(ServiceError::Unauthorized)?;
        // The account behind the token must still exist.
        match self.users.find_by_id(&claims.sub).await? {
            Some(user) => Ok(user.into()),
            None => Err(ServiceError::Unauthorized),
        }
    }
}

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};

use crate::error::{ServiceError, StoreError};
use crate::models::user::Identity;
use crate::services::auth_service::{AuthProvider, NewAccount};

/// Delegates accounts to a GoTrue-compatible hosted auth service.
#[derive(Clone)]
pub struct HostedAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl HostedAuth {
    pub fn new(base_url: String, anon_key: String, service_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            anon_key,
            service_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn read_body(res: Response) -> Result<(bool, Value), ServiceError> {
        let ok = res.status().is_success();
        let text = res.text().await.map_err(unreachable_upstream)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((ok, body))
    }
}

fn unreachable_upstream(e: reqwest::Error) -> ServiceError {
    StoreError::Unavailable(format!("auth service request failed: {e}")).into()
}

/// Picks the user-visible message out of an upstream error body.
pub fn error_message(body: &Value) -> String {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .unwrap_or("Authentication service rejected the request")
        .to_string()
}

/// Maps a `/user` response to an Identity. The display name falls back to
/// the local part of the email.
pub fn identity_from_user(body: &Value) -> Option<Identity> {
    let id = body.get("id")?.as_str()?.to_string();
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
    let name = body
        .pointer("/user_metadata/name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    Some(Identity { id, email, name })
}

#[async_trait]
impl AuthProvider for HostedAuth {
    async fn signup(&self, account: NewAccount) -> Result<(), ServiceError> {
        let res = self
            .client
            .post(self.url("admin/users"))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&json!({
                "email": account.email,
                "password": account.password,
                "email_confirm": true,
                "user_metadata": { "name": account.name },
            }))
            .send()
            .await
            .map_err(unreachable_upstream)?;

        let (ok, body) = Self::read_body(res).await?;
        if !ok {
            return Err(ServiceError::InvalidInput(error_message(&body)));
        }
        tracing::info!(email = %account.email, "hosted account created");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let res = self
            .client
            .post(self.url("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(unreachable_upstream)?;

        let (ok, body) = Self::read_body(res).await?;
        if !ok {
            tracing::debug!(reason = %error_message(&body), "hosted login rejected");
            return Err(ServiceError::InvalidCredentials);
        }
        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Unavailable("auth service returned no access_token".to_string()).into())
    }

    async fn resolve(&self, token: &str) -> Result<Identity, ServiceError> {
        let res = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(unreachable_upstream)?;

        let (ok, body) = Self::read_body(res).await?;
        if !ok {
            return Err(ServiceError::Unauthorized);
        }
        identity_from_user(&body).ok_or(ServiceError::Unauthorized)
    }
}

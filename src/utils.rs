use argon2::{self, password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng}, Argon2};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::Identity;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // User ID
    pub email: String,
    pub name: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match argon2::PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok(),
        Err(_) => false,
    }
}

pub fn generate_jwt(identity: &Identity, secret: &str, ttl_hours: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::Utc::now() + chrono::Duration::hours(ttl_hours);
    let claims = Claims {
        sub: identity.id.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        exp: expiration.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims).ok()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

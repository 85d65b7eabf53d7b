use axum::{
    body::{to_bytes, Body},
    http::{self, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    config::Config,
    db::Stores,
    routes,
    utils::validate_jwt,
};

pub const TEST_SECRET: &str = "test_secret";

pub struct TestContext {
    pub app: Router,
    pub stores: Stores,
    pub config: Arc<Config>,
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub token: String,
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test configuration must be valid")
}

pub fn setup() -> TestContext {
    let config = Arc::new(test_config());
    let stores = Stores::in_memory();
    let app = routes::init_routes(config.clone(), stores.clone());

    TestContext { app, stores, config }
}

/// Helper to create a JSON body for requests.
pub fn json_body(json: &Value) -> Body {
    Body::from(json.to_string())
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(json_body(body)).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(http::Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends a request through the router and decodes the JSON response body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Signs up and logs in through the HTTP routes, returning a valid token.
pub async fn create_test_user(ctx: &TestContext, name: &str, email: &str) -> TestUser {
    let (status, _) = send(
        &ctx.app,
        post_json("/signup", None, &json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed for {email}");

    let (status, body) = send(
        &ctx.app,
        post_json("/login", None, &json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {email}");

    let token = body["access_token"].as_str().expect("login returns a token").to_string();
    let claims = validate_jwt(&token, TEST_SECRET).expect("token must validate");

    TestUser {
        id: claims.sub,
        name: name.to_string(),
        token,
    }
}

pub async fn submit(ctx: &TestContext, user: &TestUser, body: Value) -> (StatusCode, Value) {
    send(&ctx.app, post_json("/submit-score", Some(&user.token), &body)).await
}

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::{IntoResponse, Response},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::middleware::auth::auth_middleware;
use crate::models::user::Identity;
use crate::routes::{ok_failure, OkFailure};
use crate::services::auth_service::{NewAccount, SharedAuth};

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub ok: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    pub access_token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub ok: bool,
    pub user: Identity,
}

fn malformed(_: JsonRejection) -> Response {
    ok_failure(ServiceError::invalid("Malformed request body"))
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing fields, weak password or email taken", body = OkFailure)
    )
)]
pub async fn signup(
    State(auth): State<SharedAuth>,
    req: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, Response> {
    let Json(req) = req.map_err(malformed)?;
    let account = NewAccount::validate(&req.name, &req.email, &req.password).map_err(ok_failure)?;

    auth.signup(account).await.map_err(ok_failure)?;
    Ok(Json(SignupResponse { ok: true }))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = OkFailure)
    )
)]
pub async fn login(
    State(auth): State<SharedAuth>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, Response> {
    let Json(req) = req.map_err(malformed)?;

    let access_token = auth.login(&req.email, &req.password).await.map_err(ok_failure)?;
    Ok(Json(LoginResponse { ok: true, access_token }))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The authenticated identity", body = MeResponse),
        (status = 401, description = "Unauthorized", body = OkFailure)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(Extension(identity): Extension<Arc<Identity>>) -> impl IntoResponse {
    Json(MeResponse {
        ok: true,
        user: (*identity).clone(),
    })
}

pub fn auth_routes(auth: SharedAuth) -> Router {
    let protected = Router::new()
        .route("/me", axum::routing::get(me))
        .layer(middleware::from_fn_with_state(auth.clone(), auth_middleware));

    Router::new()
        .route("/signup", axum::routing::post(signup))
        .route("/login", axum::routing::post(login))
        .with_state(auth)
        .merge(protected)
}

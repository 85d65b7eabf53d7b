use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{openapi::{security::{HttpAuthScheme, HttpBuilder, SecurityScheme}, SecurityRequirement}, Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, routes::init_routes};

mod config;
mod db;
mod error;
mod routes;
mod services;

mod models;
mod utils;
mod middleware;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        routes::auth::signup,
        routes::auth::login,
        routes::auth::me,
        routes::scores::submit_score,
        routes::scores::my_scores,
        routes::scores::my_score,
        routes::leaderboard::get_leaderboard,
    ),
    components(
        schemas(
            routes::OkFailure,
            routes::SuccessFailure,
            routes::auth::SignupRequest,
            routes::auth::SignupResponse,
            routes::auth::LoginRequest,
            routes::auth::LoginResponse,
            routes::auth::MeResponse,
            routes::scores::SubmitScoreResponse,
            routes::scores::MyScoresResponse,
            routes::scores::MyScoreResponse,
            routes::leaderboard::LeaderboardResponse,
            services::score_service::ScoreSubmission,
            models::user::Identity,
            models::score::ScoreSummary,
            models::leaderboard::LeaderboardEntry,
        ),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Injects a `bearer_auth` SecurityScheme and makes it a global requirement.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let comps = openapi.components.get_or_insert_with(Default::default);

        comps.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

        // <NameType, ScopesIteratorType, ScopeItemType>
        let sr = SecurityRequirement::new::<String, Vec<String>, String>(
            "bearer_auth".to_string(),
            Vec::<String>::new(),
        );
        openapi.security = Some(vec![sr]);
    }
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    dotenv::dotenv().ok();

    let config = Config::from_secrets(&secrets).map_err(shuttle_runtime::CustomError::new)?;
    let stores = db::init_db(&config).await.map_err(shuttle_runtime::CustomError::new)?;
    tracing::info!(store = ?config.store, default_quiz = %config.default_quiz, "starting quiz backend");

    let app = Router::new()
        .merge(init_routes(Arc::new(config), stores))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app.into())
}

#[cfg(test)]
mod tests;

pub mod auth_service;
pub mod hosted_auth;
pub mod leaderboard_service;
pub mod score_service;

pub mod leaderboard;
pub mod score;
pub mod user;

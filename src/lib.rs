//! Terminal maze-chase game with a small high-score leaderboard.

pub mod api;
pub mod config;
pub mod enemy;
pub mod error;
pub mod leaderboard;
pub mod maze;
pub mod render;
pub mod session;

//! Environment-driven settings for the game and the leaderboard server.

use crate::leaderboard::LeaderboardConfig;
use crate::maze::{MazeConfig, PostProcess, DEFAULT_GRID_H, DEFAULT_GRID_W};
use std::env;
use std::path::PathBuf;

const DEFAULT_TICK_MS: u64 = 70;
const DEFAULT_RENDER_FPS: u64 = 120;
const DEFAULT_LEADERBOARD_FILE: &str = "leaderboard.json";
const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_SERVER_FILE: &str = "scores.json";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub tick_ms: u64,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub maze: MazeConfig,
    pub player_name: Option<String>,
    pub leaderboard: LeaderboardConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let leaderboard = match non_empty(var("MAZE_LEADERBOARD_URL")) {
            Some(url) => LeaderboardConfig::Remote(url),
            None => LeaderboardConfig::Local(PathBuf::from(
                non_empty(var("MAZE_LEADERBOARD_FILE"))
                    .unwrap_or_else(|| DEFAULT_LEADERBOARD_FILE.to_string()),
            )),
        };
        Self {
            tick_ms: positive(var("MAZE_TICK_MS")).unwrap_or(DEFAULT_TICK_MS),
            render_fps: positive(var("MAZE_FPS")).unwrap_or(DEFAULT_RENDER_FPS),
            seed: var("MAZE_SEED").and_then(|v| v.trim().parse().ok()),
            maze: MazeConfig::new(
                DEFAULT_GRID_W,
                DEFAULT_GRID_H,
                parse_post_process(var("MAZE_VARIANT").as_deref()),
            ),
            player_name: non_empty(var("MAZE_PLAYER")),
            leaderboard,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    pub addr: String,
    pub store_path: PathBuf,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            addr: non_empty(var("LEADERBOARD_ADDR"))
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            store_path: PathBuf::from(
                non_empty(var("LEADERBOARD_FILE"))
                    .unwrap_or_else(|| DEFAULT_SERVER_FILE.to_string()),
            ),
        }
    }
}

fn positive(value: Option<String>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_post_process(value: Option<&str>) -> PostProcess {
    match value.map(str::trim) {
        Some("extra-passages") | Some("extra_passages") => PostProcess::ExtraPassages,
        _ => PostProcess::BreakDeadEnds,
    }
}

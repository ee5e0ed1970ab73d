//! High-score storage.
//!
//! [`ScoreStore`] is the one capability the game and the HTTP endpoints need:
//! read the best scores, append a new one. [`LocalStore`] keeps a JSON file,
//! [`MemoryStore`] a plain vector, [`RemoteStore`] talks to the
//! `/api/get-scores` and `/api/submit-score` endpoints.

use crate::error::StoreError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entries shown on the board.
pub const LEADERBOARD_SIZE: usize = 7;
const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

pub trait ScoreStore {
    /// Highest scores first, at most `limit` of them.
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError>;

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), StoreError>;
}

/// Stable, so equal scores keep submission order.
fn sort_descending(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<ScoreEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreStore for MemoryStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        self.entries.push(entry);
        sort_descending(&mut self.entries);
        Ok(())
    }
}

/// The whole list, sorted, persisted as a JSON array.
#[derive(Clone, Debug)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn scratch_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Writes a sibling file and renames it over the list, so a crash
    /// mid-write leaves the previous list intact.
    fn replace(&self, text: &str) -> Result<(), StoreError> {
        let scratch = self.scratch_path();
        fs::write(&scratch, text)?;
        fs::rename(&scratch, &self.path)?;
        Ok(())
    }
}

impl ScoreStore for LocalStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        let mut entries = self.load()?;
        sort_descending(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.push(entry);
        sort_descending(&mut entries);
        self.replace(&serde_json::to_string_pretty(&entries)?)?;
        debug!("stored {} scores in {}", entries.len(), self.path.display());
        Ok(())
    }
}

/// Client for a hosted leaderboard serving the two `/api` endpoints.
pub struct RemoteStore {
    base_url: String,
    agent: ureq::Agent,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(REMOTE_TIMEOUT).build();
        Self { base_url, agent }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }
}

impl ScoreStore for RemoteStore {
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        let response = self.agent.get(&self.endpoint("get-scores")).call()?;
        let mut entries: Vec<ScoreEntry> = response.into_json()?;
        entries.truncate(limit);
        Ok(entries)
    }

    fn submit(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        self.agent
            .post(&self.endpoint("submit-score"))
            .send_json(&entry)?;
        Ok(())
    }
}

/// Which store backs the game's board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaderboardConfig {
    Local(PathBuf),
    Remote(String),
}

impl LeaderboardConfig {
    pub fn open(&self) -> Box<dyn ScoreStore> {
        match self {
            LeaderboardConfig::Local(path) => Box::new(LocalStore::new(path.clone())),
            LeaderboardConfig::Remote(url) => Box::new(RemoteStore::new(url.clone())),
        }
    }
}

/// Best-effort wrapper used by the game. Failures are logged and swallowed so
/// they never reach the simulation.
pub struct Leaderboard {
    store: Box<dyn ScoreStore>,
}

impl Leaderboard {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self { store }
    }

    pub fn from_config(config: &LeaderboardConfig) -> Self {
        Self::new(config.open())
    }

    pub fn record(&mut self, name: &str, score: u64) {
        if let Err(err) = self.store.submit(ScoreEntry::new(name, score)) {
            warn!("could not submit score for {}: {}", name, err);
        }
    }

    /// Empty when the store cannot be reached.
    pub fn top(&self) -> Vec<ScoreEntry> {
        match self.store.top_scores(LEADERBOARD_SIZE) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("could not fetch leaderboard: {}", err);
                Vec::new()
            }
        }
    }
}

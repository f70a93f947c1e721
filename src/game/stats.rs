//! Cumulative Statistics
//!
//! Running player statistics and the store contract the session
//! persists them through. The store is an external collaborator: a
//! first run with no saved file must yield all-zero defaults rather
//! than an error.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics carried across rounds and sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Total rounds won.
    pub total_wins: u32,
    /// Consecutive wins; reset to zero on a loss.
    pub win_streak: u32,
    /// Best timed-mode completion in seconds, if any.
    pub fastest_time: Option<u64>,
    /// Rounds played to completion.
    pub games_played: u32,
    /// Local-multiplayer score for player one.
    pub player1_score: u32,
    /// Local-multiplayer score for player two.
    pub player2_score: u32,
    /// When a round last completed.
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

/// Store failure.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Filesystem access failed.
    #[error("stats io error: {0}")]
    Io(#[from] std::io::Error),

    /// Saved payload could not be parsed.
    #[error("stats decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Persistence contract for statistics.
pub trait StatsStore: Send + Sync {
    /// Load saved statistics; absence yields defaults.
    fn load(&self) -> Result<Stats, StatsError>;
    /// Persist statistics.
    fn save(&self, stats: &Stats) -> Result<(), StatsError>;
}

/// JSON-file-backed store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<Stats, StatsError> {
        if !self.path.exists() {
            return Ok(Stats::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, stats: &Stats) -> Result<(), StatsError> {
        let raw = serde_json::to_string_pretty(stats)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Stats>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for MemoryStore {
    fn load(&self) -> Result<Stats, StatsError> {
        Ok(self.inner.lock().expect("stats lock poisoned").clone())
    }

    fn save(&self, stats: &Stats) -> Result<(), StatsError> {
        *self.inner.lock().expect("stats lock poisoned") = stats.clone();
        Ok(())
    }
}

//! High score table persisted as JSON
//!
//! Storage problems never reach gameplay: a table that cannot be read starts
//! empty, and a failed save is logged and forgotten.

use crate::error::StoreError;
use crate::events::GameOverInfo;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Number of scores kept
pub const MAX_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl ScoreEntry {
    /// Entry for a finished game, stamped with the current time
    pub fn from_game_over(info: GameOverInfo) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            score: info.score,
            lines: info.lines,
            level: info.level,
            timestamp,
        }
    }
}

/// Top scores, best first
#[derive(Debug, Clone, Default)]
pub struct HighScoreStore {
    entries: Vec<ScoreEntry>,
    /// None keeps the table in memory only
    path: Option<PathBuf>,
}

impl HighScoreStore {
    /// Location under the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.data_dir().join("highscores.json"))
    }

    /// An unsaved table
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the table at the default path
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(path),
            None => Self::in_memory(),
        }
    }

    /// Load the table at `path`; unreadable data gives an empty table bound to the same path
    pub fn load(path: PathBuf) -> Self {
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(e) => {
                if path.exists() {
                    warn!("high scores at {} unreadable: {}", path.display(), e);
                }
                Vec::new()
            }
        };
        let mut store = Self {
            entries,
            path: Some(path),
        };
        store.normalize();
        store
    }

    fn read(path: &Path) -> Result<Vec<ScoreEntry>, StoreError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    fn normalize(&mut self) {
        // stable: earlier entries win ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_SCORES);
    }

    /// Record a score and persist the table
    pub fn add(&mut self, entry: ScoreEntry) -> &[ScoreEntry] {
        self.entries.push(entry);
        self.normalize();
        if let Some(path) = &self.path {
            if let Err(e) = self.write(path) {
                warn!("could not save high scores to {}: {}", path.display(), e);
            }
        }
        &self.entries
    }

    /// Whether `score` would make it onto the table
    pub fn is_high_score(&self, score: u64) -> bool {
        match self.entries.get(MAX_SCORES - 1) {
            Some(lowest) => score > lowest.score,
            None => true,
        }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> ScoreEntry {
        ScoreEntry {
            score,
            lines: 0,
            level: 1,
            timestamp: 0,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("blockfall-scores-{}-{}", std::process::id(), name))
            .join("highscores.json")
    }

    #[test]
    fn test_ranked_and_bounded() {
        let mut store = HighScoreStore::in_memory();
        for score in [300, 100, 900, 500, 200, 800, 700, 400, 600, 1000, 50, 150] {
            store.add(entry(score));
        }
        let scores: Vec<_> = store.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1000, 900, 800, 700, 600, 500, 400, 300, 200, 150]);
        assert_eq!(store.best(), Some(1000));
    }

    #[test]
    fn test_is_high_score() {
        let mut store = HighScoreStore::in_memory();
        assert!(store.is_high_score(0));
        for score in 1..=10 {
            store.add(entry(score * 10));
        }
        assert!(!store.is_high_score(10));
        assert!(store.is_high_score(11));
    }

    #[test]
    fn test_persists_between_loads() {
        let path = temp_path("persist");
        {
            let mut store = HighScoreStore::load(path.clone());
            store.add(entry(1200));
            store.add(entry(3400));
        }
        let store = HighScoreStore::load(path.clone());
        let scores: Vec<_> = store.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![3400, 1200]);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let mut store = HighScoreStore::load(path.clone());
        assert!(store.entries().is_empty());
        store.add(entry(5));
        assert_eq!(store.entries().len(), 1);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unwritable_path_does_not_fail() {
        // A directory where the file should be makes every write fail
        let path = temp_path("blocked");
        fs::create_dir_all(&path).unwrap();

        let mut store = HighScoreStore::load(path.clone());
        store.add(entry(77));
        assert_eq!(store.best(), Some(77));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_entry_from_game_over() {
        let entry = ScoreEntry::from_game_over(GameOverInfo {
            score: 4200,
            lines: 31,
            level: 4,
        });
        assert_eq!((entry.score, entry.lines, entry.level), (4200, 31, 4));
        assert!(entry.timestamp > 0);
    }
}

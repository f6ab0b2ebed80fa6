//! High score leaderboard
//!
//! Fed with the final score at game-over, keeps the top 10 named entries.
//! Persisted as JSON next to the runner.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Name recorded when the player leaves it blank
pub const ANONYMOUS: &str = "Anonymous";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score. Ties rank below existing entries.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, name: &str, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let name = name.trim();
        let entry = HighScoreEntry {
            name: if name.is_empty() {
                ANONYMOUS.to_string()
            } else {
                name.to_string()
            },
            score,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score on record
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file; a missing file is an empty leaderboard
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No high scores found, starting fresh");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("a", 50, 0.0), Some(1));
        assert_eq!(scores.add_score("b", 80, 0.0), Some(1));
        assert_eq!(scores.add_score("c", 60, 0.0), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![80, 60, 50]);
        assert_eq!(scores.top_score(), Some(80));
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        let mut scores = HighScores::new();
        scores.add_score("   ", 10, 0.0);
        scores.add_score(" Miyu ", 5, 0.0);
        assert_eq!(scores.entries[0].name, ANONYMOUS);
        assert_eq!(scores.entries[1].name, "Miyu");
    }

    #[test]
    fn test_zero_score_still_recorded() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("x", 0, 0.0), Some(1));
    }

    #[test]
    fn test_keeps_top_ten() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score("p", i * 10, 0.0);
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score("late", 5, 0.0), None);
        assert_eq!(scores.potential_rank(55), Some(6));
        assert_eq!(scores.add_score("mid", 55, 0.0), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("pentaro_hs_{}.json", std::process::id()));
        let mut scores = HighScores::new();
        scores.add_score("a", 42, 1.0);
        scores.save(&path).unwrap();
        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded, scores);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let loaded = HighScores::load(Path::new("/nonexistent/pentaro/hs.json")).unwrap();
        assert!(loaded.is_empty());
    }
}

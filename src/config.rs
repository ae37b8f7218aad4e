//! Run configuration and loading from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::entity::PlayerId;
use crate::model::history::History;
use crate::model::weights::Weights;
use crate::rng;
use crate::schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ScheduleError),
}

fn default_courts() -> usize {
    1
}

fn default_matches_per_court() -> usize {
    1
}

/// Everything one scheduling run needs. Field names follow the camelCase keys
/// used by the club app (`matchesPerCourt`, `teammateHistory`, `dateSeed`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Roster, in caller order. Duplicates are ignored.
    pub players: Vec<PlayerId>,

    #[serde(default = "default_courts")]
    pub courts: usize,

    /// Rounds to schedule on every court.
    #[serde(default = "default_matches_per_court")]
    pub matches_per_court: usize,

    #[serde(flatten)]
    pub history: History,

    /// Seed basis, usually the session date (`2025-01-01`).
    #[serde(default)]
    pub date_seed: String,

    /// Mix fresh entropy into the seed so repeated calls differ.
    #[serde(default)]
    pub randomize: bool,

    #[serde(default)]
    pub no_double_rest: bool,

    #[serde(default)]
    pub weights: Weights,
}

impl ScheduleConfig {
    pub fn new(players: Vec<PlayerId>, courts: usize, matches_per_court: usize) -> ScheduleConfig {
        ScheduleConfig {
            players,
            courts,
            matches_per_court,
            history: History::default(),
            date_seed: String::new(),
            randomize: false,
            no_double_rest: false,
            weights: Weights::default(),
        }
    }

    pub fn with_seed(mut self, date_seed: &str) -> Self {
        self.date_seed = date_seed.to_string();
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn randomized(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn with_no_double_rest(mut self, no_double_rest: bool) -> Self {
        self.no_double_rest = no_double_rest;
        self
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<ScheduleConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ScheduleConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.courts == 0 {
            return Err(ScheduleError::InvalidCourts(self.courts));
        }
        if self.matches_per_court == 0 {
            return Err(ScheduleError::InvalidMatchesPerCourt(self.matches_per_court));
        }
        if self.courts.checked_mul(self.matches_per_court).is_none() {
            return Err(ScheduleError::TooManyMatches {
                courts: self.courts,
                matches_per_court: self.matches_per_court,
            });
        }
        for (name, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ScheduleError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }

    /// Saturates; [`ScheduleConfig::validate`] rejects counts that overflow.
    pub fn total_matches(&self) -> usize {
        self.courts.saturating_mul(self.matches_per_court)
    }

    /// The string the rng is seeded from for this run.
    pub fn seed_string(&self) -> String {
        if self.randomize {
            rng::with_entropy(&self.date_seed)
        } else {
            self.date_seed.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn players(n: usize) -> Vec<PlayerId> {
        (1..=n).map(|i| format!("P{i}")).collect()
    }

    #[test]
    fn test_parse_camel_case_options() {
        let json = r#"{
            "players": ["a", "b", "c", "d"],
            "courts": 2,
            "matchesPerCourt": 3,
            "teammateHistory": [{"a": "a", "b": "b", "count": 4}],
            "dateSeed": "2025-01-01",
            "noDoubleRest": true,
            "weights": {"jitter": 0.5}
        }"#;
        let config: ScheduleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.courts, 2);
        assert_eq!(config.matches_per_court, 3);
        assert_eq!(config.history.teammate_history.get_pair("b", "a"), 4);
        assert!(config.history.opponent_history.is_empty());
        assert_eq!(config.date_seed, "2025-01-01");
        assert!(config.no_double_rest);
        assert!(!config.randomize);
        assert_eq!(config.weights.jitter, 0.5);
        assert_eq!(config.total_matches(), 6);
    }

    #[test]
    fn test_defaults() {
        let config: ScheduleConfig = serde_json::from_str(r#"{"players": []}"#).unwrap();
        assert_eq!(config, ScheduleConfig::new(vec![], 1, 1));
    }

    #[test]
    fn test_validate_rejects_zero_courts() {
        let config = ScheduleConfig::new(players(8), 0, 2);
        assert_eq!(config.validate(), Err(ScheduleError::InvalidCourts(0)));
    }

    #[test]
    fn test_validate_rejects_zero_matches_per_court() {
        let config = ScheduleConfig::new(players(8), 2, 0);
        assert_eq!(config.validate(), Err(ScheduleError::InvalidMatchesPerCourt(0)));
    }

    #[test]
    fn test_validate_rejects_overflowing_match_count() {
        let config = ScheduleConfig::new(players(8), usize::MAX, 2);
        assert_eq!(
            config.validate(),
            Err(ScheduleError::TooManyMatches { courts: usize::MAX, matches_per_court: 2 })
        );
        assert_eq!(config.total_matches(), usize::MAX);

        let largest = ScheduleConfig::new(players(8), usize::MAX, 1);
        assert_eq!(largest.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut config = ScheduleConfig::new(players(8), 2, 2);
        config.weights.fairness = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ScheduleError::InvalidWeight { name: "fairness", .. })
        ));
    }

    #[test]
    fn test_seed_string() {
        let fixed = ScheduleConfig::new(players(4), 1, 1).with_seed("2025-01-01");
        assert_eq!(fixed.seed_string(), "2025-01-01");
        let random = fixed.clone().randomized(true);
        assert_ne!(random.seed_string(), random.seed_string());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"players": ["a", "b", "c", "d"], "courts": 1, "matchesPerCourt": 2}}"#).unwrap();
        let config = ScheduleConfig::from_path(file.path()).unwrap();
        assert_eq!(config.players.len(), 4);
        assert_eq!(config.matches_per_court, 2);
    }

    #[test]
    fn test_from_path_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"players": ["a"], "courts": 0}}"#).unwrap();
        assert!(matches!(ScheduleConfig::from_path(file.path()), Err(ConfigError::Invalid(_))));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, r#"{{"players": "not a list"}}"#).unwrap();
        assert!(matches!(ScheduleConfig::from_path(broken.path()), Err(ConfigError::Parse(_))));

        assert!(matches!(ScheduleConfig::from_path("/nonexistent/court-shuffle.json"), Err(ConfigError::Read(_))));
    }
}

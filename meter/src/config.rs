//! Scoring thresholds and weights.
//!
//! `ScoringConfig::default()` holds the calibrated constants. Overrides can
//! be read from a TOML file where every field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Novelty thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoveltyConfig {
    /// Token-set similarity at or above which a claim is a near-duplicate.
    pub similarity_threshold: f64,
    /// Combined rate strictly below this is LOW.
    pub low_threshold: f64,
    /// Combined rate strictly above this is HIGH.
    pub high_threshold: f64,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            low_threshold: 0.15,
            high_threshold: 0.5,
        }
    }
}

/// Readiness weights and tier cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub actions_weight: f64,
    pub questions_weight: f64,
    pub blocker_weight: f64,
    /// Readiness at or above this is HIGH.
    pub high_threshold: f64,
    /// Readiness at or above this (and below HIGH) is MEDIUM.
    pub medium_threshold: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            actions_weight: 0.5,
            questions_weight: 0.3,
            blocker_weight: 0.2,
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

/// Complete scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub novelty: NoveltyConfig,
    pub readiness: ReadinessConfig,
    /// Trailing low-novelty rounds (without HIGH readiness) that force escalation.
    pub plateau_rounds: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            novelty: NoveltyConfig::default(),
            readiness: ReadinessConfig::default(),
            plateau_rounds: 3,
        }
    }
}

impl ScoringConfig {
    /// Load overrides from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Toml(message) => ConfigError::TomlFile {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scorer cannot use meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.novelty;
        if !(0.0..=1.0).contains(&n.similarity_threshold) {
            return Err(ConfigError::Invalid(
                "novelty.similarity_threshold must be within [0, 1]".into(),
            ));
        }
        if n.low_threshold > n.high_threshold {
            return Err(ConfigError::Invalid(
                "novelty.low_threshold must not exceed novelty.high_threshold".into(),
            ));
        }
        let r = &self.readiness;
        if r.medium_threshold > r.high_threshold {
            return Err(ConfigError::Invalid(
                "readiness.medium_threshold must not exceed readiness.high_threshold".into(),
            ));
        }
        if [r.actions_weight, r.questions_weight, r.blocker_weight]
            .iter()
            .any(|w| *w < 0.0)
        {
            return Err(ConfigError::Invalid(
                "readiness weights must be non-negative".into(),
            ));
        }
        if self.plateau_rounds == 0 {
            return Err(ConfigError::Invalid("plateau_rounds must be at least 1".into()));
        }
        Ok(())
    }
}

/// Errors reading a scoring configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(String),

    #[error("invalid TOML in {path}: {message}")]
    TomlFile { path: PathBuf, message: String },

    #[error("invalid scoring config: {0}")]
    Invalid(String),
}

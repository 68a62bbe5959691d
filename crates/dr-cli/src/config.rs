//! Runtime configuration: scoring overrides from `--config`, embedding
//! endpoint from the environment.

use std::path::Path;

use anyhow::{Context, Result};
use meter::{EmbeddingConfig, ScoringConfig};
use tracing::debug;

/// Everything the binary needs besides the transcript itself.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    /// Present only when `DR_OLLAMA_URL` is set. Scoring never uses it.
    pub embedding: Option<EmbeddingConfig>,
}

impl AppConfig {
    /// Build from an optional TOML override file plus the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let scoring = match config_path {
            Some(path) => ScoringConfig::from_toml_file(path)
                .with_context(|| format!("loading scoring config {}", path.display()))?,
            None => ScoringConfig::default(),
        };

        let embedding = EmbeddingConfig::from_env();
        match &embedding {
            Some(e) => debug!(endpoint = %e.endpoint, model = %e.model, "embedding adjunct configured"),
            None => debug!("embedding adjunct disabled (DR_OLLAMA_URL unset)"),
        }

        Ok(Self { scoring, embedding })
    }
}

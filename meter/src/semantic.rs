//! Embedding adjunct — optional, best-effort semantic vectors.
//!
//! Nothing in the scoring path calls this module. It is enabled only when
//! `DR_OLLAMA_URL` is set, and exposes the two numeric helpers the rest of a
//! semantic pipeline would need:
//!
//! - [`cosine_similarity`] between two equal-length vectors
//! - [`mean_vector`] over a non-empty set of equal-length vectors
//!
//! Environment:
//! - `DR_OLLAMA_URL`, e.g. `http://127.0.0.1:11434` (required to enable)
//! - `DR_OLLAMA_EMBED_MODEL`, default `nomic-embed-text`
//! - `DR_OLLAMA_TIMEOUT_S`: request timeout in seconds, default 10
//! - `DR_OLLAMA_RETRIES`: attempts per prompt, default 2

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Errors from the embedding adjunct.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("vectors must have the same dimension ({left} != {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("cannot compute the mean of an empty vector list")]
    EmptyInput,

    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding response missing 'embedding'")]
    MissingEmbedding,
}

/// Embedding endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL, without trailing slash.
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    /// Attempts per prompt (at least 1).
    pub attempts: u32,
}

impl EmbeddingConfig {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Read configuration from the environment. `None` when `DR_OLLAMA_URL` is unset or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let url = lookup("DR_OLLAMA_URL").filter(|u| !u.trim().is_empty())?;
        let model = lookup("DR_OLLAMA_EMBED_MODEL")
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut config = Self::new(url.trim(), &model);
        if let Some(raw) = lookup("DR_OLLAMA_TIMEOUT_S").filter(|v| !v.is_empty()) {
            match raw.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => {
                    config.timeout = Duration::from_secs_f64(secs)
                }
                _ => warn!(value = %raw, "ignoring invalid DR_OLLAMA_TIMEOUT_S"),
            }
        }
        if let Some(raw) = lookup("DR_OLLAMA_RETRIES").filter(|v| !v.is_empty()) {
            match raw.parse::<u32>() {
                Ok(n) if n > 0 => config.attempts = n,
                _ => warn!(value = %raw, "ignoring invalid DR_OLLAMA_RETRIES"),
            }
        }
        Some(config)
    }
}

/// Source of embedding vectors.
pub trait EmbeddingBackend {
    /// Embed each prompt, preserving order.
    fn embed(&self, prompts: &[String]) -> Result<Vec<Vec<f64>>, SemanticError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f64>>,
}

/// Ollama embeddings client (`POST {endpoint}/api/embeddings`).
pub struct OllamaEmbedder {
    config: EmbeddingConfig,
    http: reqwest::blocking::Client,
}

impl OllamaEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, SemanticError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SemanticError::Request(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn url(&self) -> String {
        format!("{}/api/embeddings", self.config.endpoint)
    }

    fn embed_one(&self, prompt: &str) -> Result<Vec<f64>, SemanticError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            prompt,
        };
        let response = self
            .http
            .post(self.url())
            .json(&request)
            .send()
            .map_err(|e| SemanticError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(SemanticError::Request(format!(
                "embeddings API error ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| SemanticError::Request(format!("failed to parse response: {}", e)))?;
        parsed
            .embedding
            .filter(|v| !v.is_empty())
            .ok_or(SemanticError::MissingEmbedding)
    }

    fn embed_with_retry(&self, prompt: &str) -> Result<Vec<f64>, SemanticError> {
        let attempts = self.config.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.embed_one(prompt) {
                Ok(v) => return Ok(v),
                Err(e) if attempt < attempts => {
                    warn!(attempt, error = %e, "embedding request failed, retrying");
                    std::thread::sleep(RETRY_BACKOFF * attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl EmbeddingBackend for OllamaEmbedder {
    fn embed(&self, prompts: &[String]) -> Result<Vec<Vec<f64>>, SemanticError> {
        debug!(count = prompts.len(), model = %self.config.model, "embedding prompts");
        prompts.iter().map(|p| self.embed_with_retry(p)).collect()
    }
}

/// Cosine similarity. Both all-zero → 1.0; exactly one all-zero → 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, SemanticError> {
    if a.len() != b.len() {
        return Err(SemanticError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let (dot, na, nb) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });
    if na == 0.0 && nb == 0.0 {
        return Ok(1.0);
    }
    if na == 0.0 || nb == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (na.sqrt() * nb.sqrt()))
}

/// Element-wise mean of equal-length vectors.
pub fn mean_vector(vectors: &[Vec<f64>]) -> Result<Vec<f64>, SemanticError> {
    let first = vectors.first().ok_or(SemanticError::EmptyInput)?;
    let dim = first.len();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(SemanticError::DimensionMismatch {
            left: dim,
            right: bad.len(),
        });
    }

    let mut out = vec![0.0; dim];
    for v in vectors {
        for (acc, x) in out.iter_mut().zip(v) {
            *acc += x;
        }
    }
    let n = vectors.len() as f64;
    Ok(out.into_iter().map(|x| x / n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_cosine_identity_and_orthogonal() {
        let same = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
        assert!((same - 1.0).abs() < 1e-6);
        let ortho = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(ortho.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 1.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SemanticError::DimensionMismatch { left: 1, right: 2 }));
    }

    #[test]
    fn test_mean_vector() {
        let v = mean_vector(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(v, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_vector_errors() {
        assert!(matches!(mean_vector(&[]), Err(SemanticError::EmptyInput)));
        assert!(matches!(
            mean_vector(&[vec![1.0], vec![1.0, 2.0]]),
            Err(SemanticError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_config_absent_without_url() {
        assert!(EmbeddingConfig::from_lookup(lookup(&[])).is_none());
        assert!(EmbeddingConfig::from_lookup(lookup(&[("DR_OLLAMA_URL", "  ")])).is_none());
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let c = EmbeddingConfig::from_lookup(lookup(&[("DR_OLLAMA_URL", "http://127.0.0.1:11434/")]))
            .unwrap();
        assert_eq!(c.endpoint, "http://127.0.0.1:11434");
        assert_eq!(c.model, "nomic-embed-text");
        assert_eq!(c.timeout, Duration::from_secs(10));
        assert_eq!(c.attempts, 2);

        let c = EmbeddingConfig::from_lookup(lookup(&[
            ("DR_OLLAMA_URL", "http://gpu:11434"),
            ("DR_OLLAMA_EMBED_MODEL", "mxbai-embed-large"),
            ("DR_OLLAMA_TIMEOUT_S", "2.5"),
            ("DR_OLLAMA_RETRIES", "nope"),
        ]))
        .unwrap();
        assert_eq!(c.model, "mxbai-embed-large");
        assert_eq!(c.timeout, Duration::from_millis(2500));
        assert_eq!(c.attempts, 2);
    }
}

//! Diminishing Returns Meter
//!
//! Scores a multi-round discussion transcript and recommends whether to keep
//! talking, ship, or escalate.
//!
//! # Pipeline
//!
//! 1. [`loader`] reads a `.json` transcript or a `.jsonl` event trace
//! 2. [`transcript`] validates the shape and drops malformed entries
//! 3. [`normalize`] canonicalizes claims per round (dedupe, sort)
//! 4. [`novelty`] tracks exact (L0) and near-duplicate (L1) novelty per round
//! 5. [`readiness`] scores next actions, open questions and blockers per round
//! 6. [`decision`] maps the latest tiers to CONTINUE / SHIP / ESCALATE
//!
//! [`score`] runs steps 3 through 6 and assembles a [`ScoreResult`].
//! [`semantic`] is an optional embedding adjunct that scoring never calls.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let transcript = meter::load_transcript(Path::new("meeting.jsonl"))?;
//! let result = meter::score_transcript(&transcript)?;
//! println!("{}", result.stop_recommendation.signal);
//! # Ok::<(), meter::MeterError>(())
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod decision;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod novelty;
pub mod readiness;
pub mod score;
pub mod semantic;
pub mod similarity;
pub mod transcript;

pub use config::{ConfigError, NoveltyConfig, ReadinessConfig, ScoringConfig};
pub use decision::{decide, DecisionInputs, DecisionRule, Signal, StopRecommendation, Tier};
pub use error::{MeterError, MeterResult};
pub use loader::load_transcript;
pub use normalize::{normalize_claim, normalize_claims};
pub use novelty::{NoveltyTracker, RoundNoveltyRecord};
pub use readiness::{ReadinessScorer, RoundReadinessRecord};
pub use score::{score_transcript, score_transcript_with, score_value, Components, ScoreResult};
pub use semantic::{
    cosine_similarity, mean_vector, EmbeddingBackend, EmbeddingConfig, OllamaEmbedder,
    SemanticError,
};
pub use transcript::{Outputs, Round, Transcript};

/// Round to 4 decimal places for reporting.
pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

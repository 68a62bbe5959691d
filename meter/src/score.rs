//! Scoring entry point: one forward pass over the rounds, then a decision.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::ScoringConfig;
use crate::decision::{classify_novelty, DecisionInputs, StopRecommendation, Tier};
use crate::error::{MeterError, MeterResult};
use crate::normalize::normalize_claims;
use crate::novelty::{trailing_low_rounds, NoveltyTracker, RoundNoveltyRecord};
use crate::readiness::{ReadinessScorer, RoundReadinessRecord};
use crate::round4;
use crate::transcript::Transcript;

/// Component scores of the latest round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
    pub novelty_rate: f64,
    #[serde(rename = "novelty_rate_L0")]
    pub novelty_rate_l0: f64,
    #[serde(rename = "novelty_rate_L1")]
    pub novelty_rate_l1: f64,
    pub action_readiness: f64,
    /// Not computed; the embedding adjunct is not wired into scoring.
    pub semantic_similarity: Option<f64>,
    /// Not computed.
    pub structural_agreement: Option<f64>,
}

/// Full result of scoring one transcript. Every fraction is rounded to 4 digits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub conversation_id: Option<String>,
    /// Stop-worthiness: mean of (1 - novelty rate) and action readiness.
    pub score: f64,
    pub components: Components,
    pub novelty_by_round: Vec<RoundNoveltyRecord>,
    pub readiness_by_round: Vec<RoundReadinessRecord>,
    pub stop_recommendation: StopRecommendation,
    pub hint: String,
}

impl ScoreResult {
    /// JSON value with object keys sorted.
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Pretty, key-sorted JSON text.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_json_value()?)
    }
}

/// Score a transcript with the calibrated defaults.
pub fn score_transcript(transcript: &Transcript) -> MeterResult<ScoreResult> {
    score_transcript_with(transcript, &ScoringConfig::default())
}

/// Validate a parsed JSON transcript and score it with the calibrated defaults.
pub fn score_value(value: &Value) -> MeterResult<ScoreResult> {
    score_transcript(&Transcript::from_value(value)?)
}

/// Score a transcript with an explicit configuration.
pub fn score_transcript_with(
    transcript: &Transcript,
    config: &ScoringConfig,
) -> MeterResult<ScoreResult> {
    transcript.ensure_rounds()?;

    let mut novelty = NoveltyTracker::new(config.novelty.similarity_threshold);
    let mut readiness = ReadinessScorer::new(config.readiness.clone());

    for round in &transcript.rounds {
        let claims = normalize_claims(&round.outputs.claims);
        novelty.observe(round.round, &claims);
        readiness.observe(round.round, &round.outputs);
    }

    let novelty_records = novelty.into_records();
    let readiness_records = readiness.into_records();
    let (last_novelty, last_readiness) = novelty_records
        .last()
        .zip(readiness_records.last())
        .ok_or_else(|| MeterError::structural("transcript produced no scored rounds"))?;

    let trailing_low = trailing_low_rounds(&novelty_records, config.novelty.low_threshold);
    let plateau = trailing_low >= config.plateau_rounds
        && readiness_records[readiness_records.len() - trailing_low..]
            .iter()
            .all(|r| r.readiness_classification != Tier::High);

    let inputs = DecisionInputs {
        novelty: classify_novelty(last_novelty.novelty_rate, &config.novelty),
        readiness: last_readiness.readiness_classification,
        blocker: last_readiness.blocker_present,
        plateau,
    };
    let stop = StopRecommendation::build(inputs, trailing_low, &last_readiness.blockers);

    info!(
        conversation_id = ?transcript.conversation_id,
        rounds = transcript.rounds.len(),
        signal = %stop.signal,
        novelty = %stop.novelty_classification,
        readiness = %stop.readiness_classification,
        trailing_low,
        "transcript scored"
    );

    let components = Components {
        novelty_rate: round4(last_novelty.novelty_rate),
        novelty_rate_l0: round4(last_novelty.novelty_rate_l0),
        novelty_rate_l1: round4(last_novelty.novelty_rate_l1),
        action_readiness: round4(last_readiness.action_readiness),
        semantic_similarity: None,
        structural_agreement: None,
    };
    let score = round4(((1.0 - last_novelty.novelty_rate) + last_readiness.action_readiness) / 2.0);

    Ok(ScoreResult {
        conversation_id: transcript.conversation_id.clone(),
        score,
        components,
        novelty_by_round: novelty_records.iter().map(RoundNoveltyRecord::rounded).collect(),
        readiness_by_round: readiness_records
            .iter()
            .map(RoundReadinessRecord::rounded)
            .collect(),
        hint: stop.signal.hint().to_string(),
        stop_recommendation: stop,
    })
}

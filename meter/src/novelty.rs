//! Novelty detection across rounds.
//!
//! Tracks which normalized claims have already appeared, at two strictness
//! tiers:
//!
//! - **L0**: exact match against every normalized claim seen so far.
//! - **L1**: near-duplicate match: a claim is only new if its token-set
//!   similarity to every previously seen claim stays below a threshold.
//!
//! Each round's new-claim count is normalized against the running peak for
//! that tier (peak includes the current round), and the round's combined rate
//! is the smaller of the two tier rates.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::similarity::{token_set, token_similarity, TokenSet};

/// Novelty figures for one round. Append-only; never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundNoveltyRecord {
    pub round: Option<i64>,
    /// Distinct normalized claims in the round.
    pub claims: usize,
    /// Conservative new-claim count: min of both tiers.
    pub new_claims: usize,
    #[serde(rename = "new_claims_L0")]
    pub new_claims_l0: usize,
    #[serde(rename = "new_claims_L1")]
    pub new_claims_l1: usize,
    /// Combined rate: min of both tier rates.
    pub novelty_rate: f64,
    #[serde(rename = "novelty_rate_L0")]
    pub novelty_rate_l0: f64,
    #[serde(rename = "novelty_rate_L1")]
    pub novelty_rate_l1: f64,
}

impl RoundNoveltyRecord {
    pub(crate) fn rounded(&self) -> Self {
        Self {
            novelty_rate: crate::round4(self.novelty_rate),
            novelty_rate_l0: crate::round4(self.novelty_rate_l0),
            novelty_rate_l1: crate::round4(self.novelty_rate_l1),
            ..self.clone()
        }
    }
}

/// Accumulator threaded through one forward pass over a transcript.
#[derive(Debug, Clone)]
pub struct NoveltyTracker {
    similarity_threshold: f64,
    seen_l0: HashSet<String>,
    seen_l1: BTreeMap<String, TokenSet>,
    peak_l0: usize,
    peak_l1: usize,
    records: Vec<RoundNoveltyRecord>,
}

impl NoveltyTracker {
    /// Create a tracker. Claims at or above `similarity_threshold` to a seen
    /// claim are near-duplicates.
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
            seen_l0: HashSet::new(),
            seen_l1: BTreeMap::new(),
            peak_l0: 0,
            peak_l1: 0,
            records: Vec::new(),
        }
    }

    /// Record one round of deduplicated, normalized claims.
    pub fn observe(&mut self, round: Option<i64>, claims: &[String]) -> &RoundNoveltyRecord {
        let tokenized: Vec<(&String, TokenSet)> =
            claims.iter().map(|c| (c, token_set(c))).collect();

        let new_l0 = claims.iter().filter(|c| !self.seen_l0.contains(*c)).count();
        let new_l1 = tokenized
            .iter()
            .filter(|(_, tokens)| self.is_near_new(tokens))
            .count();

        for (claim, tokens) in tokenized {
            self.seen_l0.insert(claim.clone());
            self.seen_l1.insert(claim.clone(), tokens);
        }

        self.peak_l0 = self.peak_l0.max(new_l0);
        self.peak_l1 = self.peak_l1.max(new_l1);

        let rate_l0 = new_l0 as f64 / self.peak_l0.max(1) as f64;
        let rate_l1 = new_l1 as f64 / self.peak_l1.max(1) as f64;

        let record = RoundNoveltyRecord {
            round,
            claims: claims.len(),
            new_claims: new_l0.min(new_l1),
            new_claims_l0: new_l0,
            new_claims_l1: new_l1,
            novelty_rate: rate_l0.min(rate_l1),
            novelty_rate_l0: rate_l0,
            novelty_rate_l1: rate_l1,
        };
        debug!(
            round = ?round,
            claims = record.claims,
            new_l0,
            new_l1,
            rate = record.novelty_rate,
            "novelty recorded"
        );

        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    fn is_near_new(&self, tokens: &TokenSet) -> bool {
        self.seen_l1
            .values()
            .all(|seen| token_similarity(tokens, seen) < self.similarity_threshold)
    }

    pub fn records(&self) -> &[RoundNoveltyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RoundNoveltyRecord> {
        self.records
    }

    /// Combined rate of the latest round (0.0 before any round).
    pub fn final_rate(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.novelty_rate)
    }

    /// Number of exact claims seen so far.
    pub fn seen_exact(&self) -> usize {
        self.seen_l0.len()
    }

    /// Number of claims available for near-duplicate comparison.
    pub fn seen_near(&self) -> usize {
        self.seen_l1.len()
    }
}

/// Count rounds from the end whose combined rate is strictly below `low_threshold`.
pub fn trailing_low_rounds(records: &[RoundNoveltyRecord], low_threshold: f64) -> usize {
    records
        .iter()
        .rev()
        .take_while(|r| r.novelty_rate < low_threshold)
        .count()
}

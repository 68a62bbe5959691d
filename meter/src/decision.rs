//! Decision engine — turns novelty and readiness tiers into a stop signal.
//!
//! The matrix and its overrides are an ordered rule table; the first rule
//! whose predicate holds decides the signal.
//!
//! ```text
//! sustained plateau (>= N low rounds, never HIGH readiness) → ESCALATE
//! novelty HIGH or MEDIUM                                    → CONTINUE
//! novelty LOW, readiness LOW                                → ESCALATE
//! novelty LOW, blocker present (would have shipped)         → ESCALATE
//! novelty LOW otherwise                                     → SHIP
//! ```

use serde::{Deserialize, Serialize};

use crate::config::NoveltyConfig;

/// Three-level classification shared by novelty and readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Final stop/continue/escalate signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Rounds are still producing new content.
    Continue,
    /// Nothing new and concrete enough to act on.
    Ship,
    /// Hand off to a person.
    Escalate,
}

impl Signal {
    /// Short human guidance for the signal.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Ship => "Diminishing returns reached: stop discussing, run verification and ship.",
            Self::Escalate => {
                "Discussion is stuck or blocked: escalate to an owner instead of another round."
            }
            Self::Continue => "Rounds are still producing new claims: run one focused round.",
        }
    }

    /// One-line next action for condensed reports.
    pub fn next_action(&self) -> &'static str {
        match self {
            Self::Ship => "run verification",
            Self::Escalate => "escalate to an owner",
            Self::Continue => "run one focused round",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "CONTINUE"),
            Self::Ship => write!(f, "SHIP"),
            Self::Escalate => write!(f, "ESCALATE"),
        }
    }
}

/// HIGH / MEDIUM / LOW novelty tier of the final combined rate.
pub fn classify_novelty(rate: f64, config: &NoveltyConfig) -> Tier {
    if rate > config.high_threshold {
        Tier::High
    } else if rate < config.low_threshold {
        Tier::Low
    } else {
        Tier::Medium
    }
}

/// Everything the decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInputs {
    pub novelty: Tier,
    pub readiness: Tier,
    /// Blocker keyword found in the latest round.
    pub blocker: bool,
    /// Trailing low-novelty run reached the plateau depth without HIGH readiness.
    pub plateau: bool,
}

/// Which rule produced the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    SustainedPlateau,
    StillNovel,
    NotReady,
    BlockerVeto,
    Ready,
}

struct Rule {
    rule: DecisionRule,
    applies: fn(&DecisionInputs) -> bool,
    signal: Signal,
}

const RULES: &[Rule] = &[
    Rule {
        rule: DecisionRule::SustainedPlateau,
        applies: |i| i.plateau,
        signal: Signal::Escalate,
    },
    Rule {
        rule: DecisionRule::StillNovel,
        applies: |i| i.novelty != Tier::Low,
        signal: Signal::Continue,
    },
    Rule {
        rule: DecisionRule::NotReady,
        applies: |i| i.readiness == Tier::Low,
        signal: Signal::Escalate,
    },
    Rule {
        rule: DecisionRule::BlockerVeto,
        applies: |i| i.blocker,
        signal: Signal::Escalate,
    },
    Rule {
        rule: DecisionRule::Ready,
        applies: |_| true,
        signal: Signal::Ship,
    },
];

/// Evaluate the rule table; the first matching rule wins.
pub fn decide(inputs: &DecisionInputs) -> (Signal, DecisionRule) {
    RULES
        .iter()
        .find(|r| (r.applies)(inputs))
        .map(|r| (r.signal, r.rule))
        .unwrap_or((Signal::Ship, DecisionRule::Ready))
}

/// The `stop_recommendation` block of a score result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRecommendation {
    pub signal: Signal,
    pub novelty_classification: Tier,
    pub readiness_classification: Tier,
    pub k_consecutive_low_novelty: usize,
    pub blocker_detected: bool,
    pub plateau_override: bool,
    pub rule: DecisionRule,
    pub rationale: String,
    /// Rationale split into its sentences.
    #[serde(skip)]
    pub reasons: Vec<String>,
}

impl StopRecommendation {
    /// Decide and explain.
    ///
    /// `blockers` are the keywords found in the latest round; `trailing_low`
    /// is the trailing low-novelty depth.
    pub fn build(inputs: DecisionInputs, trailing_low: usize, blockers: &[String]) -> Self {
        let (signal, rule) = decide(&inputs);

        let mut reasons = vec![
            format!(
                "Novelty is {} ({} trailing low-novelty round{}).",
                inputs.novelty,
                trailing_low,
                if trailing_low == 1 { "" } else { "s" }
            ),
            format!("Readiness is {}.", inputs.readiness),
        ];
        if inputs.blocker {
            reasons.push(format!(
                "Blocker detected in latest round ({}).",
                blockers.join(", ")
            ));
        }
        if rule == DecisionRule::BlockerVeto {
            reasons.push("Blocker overrode a SHIP outcome.".to_string());
        }
        if rule == DecisionRule::SustainedPlateau {
            reasons.push(format!(
                "Sustained plateau: {} consecutive low-novelty rounds without HIGH readiness.",
                trailing_low
            ));
        }

        Self {
            signal,
            novelty_classification: inputs.novelty,
            readiness_classification: inputs.readiness,
            k_consecutive_low_novelty: trailing_low,
            blocker_detected: inputs.blocker,
            plateau_override: rule == DecisionRule::SustainedPlateau,
            rule,
            rationale: reasons.join(" "),
            reasons,
        }
    }
}

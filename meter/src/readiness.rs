//! Readiness scoring. Is the latest round concrete enough to act on?
//!
//! Three sub-scores, weighted into a single action readiness figure:
//!
//! | sub-score                 | weight | source                          |
//! |---------------------------|--------|---------------------------------|
//! | next-actions specificity  | 0.5    | `outputs.next_actions`          |
//! | open-questions trend      | 0.3    | `outputs.open_questions` vs the previous round |
//! | blocker score             | 0.2    | keywords in questions + actions |
//!
//! Every round gets a record; only the last one feeds the decision.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ReadinessConfig;
use crate::decision::Tier;
use crate::transcript::Outputs;

const VAGUE_PREFIXES: &[&str] = &["consider", "explore", "look into", "investigate", "think about"];

const VAGUE_MARKERS: &[&str] = &["maybe", "might", "possibly", "could potentially"];

const IMPERATIVE_VERBS: &[&str] = &[
    "run", "write", "create", "deploy", "ship", "fix", "add", "remove", "delete", "update",
    "implement", "merge", "draft", "send", "schedule", "publish", "release", "benchmark",
    "measure", "document", "review", "refactor", "rename", "configure", "install", "migrate",
    "commit", "push", "verify", "validate", "rollback", "revert", "enable", "disable", "email",
    "upload", "build",
];

const ARTIFACT_WORDS: &[&str] = &["pr", "branch", "file", "url", "command", "tool"];

const OWNERSHIP_MARKERS: &[&str] = &[
    "i will", "i'll", "owner", "assigned to", "assignee", "owned by", "will own", "@",
];

const BLOCKER_KEYWORDS: &[&str] = &[
    "blocked",
    "blocker",
    "waiting on",
    "depends on",
    "need access",
    "need permission",
    "can't proceed",
    "prerequisite",
    "missing",
];

/// Actions shorter than this need an imperative verb to count as specific.
const MIN_WORDS_WITHOUT_VERB: usize = 5;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL_RE regex should compile"));

/// Path-like tokens (`src/lib.rs`, `~/bin`, `./run.sh`).
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)(~|\.{1,2})?/?[\w.-]+/[\w./-]*").expect("PATH_RE regex should compile")
});

static FILE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b[\w-]+\.(rs|py|ts|tsx|js|jsx|go|java|rb|c|h|cpp|md|txt|json|jsonl|toml|yaml|yml|sh|sql|csv|html|css|lock|ipynb)\b",
    )
    .expect("FILE_EXT_RE regex should compile")
});

/// Readiness figures for one round. Append-only; never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReadinessRecord {
    pub round: Option<i64>,
    /// Non-empty next actions.
    pub next_actions: usize,
    pub specific_actions: usize,
    /// Non-empty open questions.
    pub open_questions: usize,
    pub next_actions_specificity: f64,
    pub open_questions_trend: f64,
    pub blocker_score: f64,
    pub blocker_present: bool,
    /// Blocker keywords found, in keyword-table order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    pub action_readiness: f64,
    pub readiness_classification: Tier,
}

impl RoundReadinessRecord {
    pub(crate) fn rounded(&self) -> Self {
        Self {
            next_actions_specificity: crate::round4(self.next_actions_specificity),
            open_questions_trend: crate::round4(self.open_questions_trend),
            blocker_score: crate::round4(self.blocker_score),
            action_readiness: crate::round4(self.action_readiness),
            ..self.clone()
        }
    }
}

/// Scores rounds in order, remembering only the previous round's question count.
#[derive(Debug, Clone)]
pub struct ReadinessScorer {
    config: ReadinessConfig,
    previous_questions: Option<usize>,
    records: Vec<RoundReadinessRecord>,
}

impl ReadinessScorer {
    pub fn new(config: ReadinessConfig) -> Self {
        Self {
            config,
            previous_questions: None,
            records: Vec::new(),
        }
    }

    /// Score one round's outputs.
    pub fn observe(&mut self, round: Option<i64>, outputs: &Outputs) -> &RoundReadinessRecord {
        let actions = non_empty(&outputs.next_actions);
        let questions = non_empty(&outputs.open_questions);

        let specific = actions.iter().filter(|a| is_specific_action(a)).count();
        let specificity = actions_specificity(&actions, specific);
        let trend = questions_trend(questions.len(), self.previous_questions);
        let blockers = detect_blockers(&questions, &actions);
        let blocker_score = if blockers.is_empty() { 1.0 } else { 0.0 };

        let c = &self.config;
        let readiness = c.actions_weight * specificity
            + c.questions_weight * trend
            + c.blocker_weight * blocker_score;

        let record = RoundReadinessRecord {
            round,
            next_actions: actions.len(),
            specific_actions: specific,
            open_questions: questions.len(),
            next_actions_specificity: specificity,
            open_questions_trend: trend,
            blocker_score,
            blocker_present: !blockers.is_empty(),
            blockers: blockers.iter().map(|b| b.to_string()).collect(),
            action_readiness: readiness,
            readiness_classification: classify_readiness(readiness, c),
        };
        debug!(
            round = ?round,
            specific,
            specificity,
            trend,
            blockers = record.blockers.len(),
            readiness,
            "readiness recorded"
        );

        self.previous_questions = Some(questions.len());
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[RoundReadinessRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RoundReadinessRecord> {
        self.records
    }

    pub fn latest(&self) -> Option<&RoundReadinessRecord> {
        self.records.last()
    }
}

/// HIGH / MEDIUM / LOW readiness tier.
pub fn classify_readiness(readiness: f64, config: &ReadinessConfig) -> Tier {
    if readiness >= config.high_threshold {
        Tier::High
    } else if readiness >= config.medium_threshold {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn non_empty(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\''))
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    words.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn starts_with_phrase(words: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    words.starts_with(&needle)
}

fn has_artifact_marker(action: &str, words: &[&str]) -> bool {
    action.contains(['`', '/', '$'])
        || URL_RE.is_match(action)
        || PATH_RE.is_match(action)
        || FILE_EXT_RE.is_match(action)
        || words.iter().any(|w| ARTIFACT_WORDS.contains(w))
}

/// Whether an action is concrete enough to execute without further discussion.
pub fn is_specific_action(action: &str) -> bool {
    let lowered = action.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }
    let words = words(&lowered);
    if VAGUE_PREFIXES.iter().any(|p| starts_with_phrase(&words, p)) {
        return false;
    }
    if VAGUE_MARKERS.iter().any(|m| contains_phrase(&words, m)) {
        return false;
    }

    let has_verb = words.iter().any(|w| IMPERATIVE_VERBS.contains(w));
    if has_verb {
        return true;
    }
    lowered.split_whitespace().count() >= MIN_WORDS_WITHOUT_VERB
        && has_artifact_marker(&lowered, &words)
}

fn has_ownership(action: &str) -> bool {
    let lowered = action.to_lowercase();
    OWNERSHIP_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Next-actions specificity sub-score.
pub fn actions_specificity(actions: &[&str], specific: usize) -> f64 {
    if actions.is_empty() {
        return 0.0;
    }
    if specific == 0 {
        return 0.3;
    }
    let owned = actions
        .iter()
        .any(|a| is_specific_action(a) && has_ownership(a));
    if specific >= 2 && owned {
        1.0
    } else {
        0.7
    }
}

/// Open-questions trend sub-score.
pub fn questions_trend(current: usize, previous: Option<usize>) -> f64 {
    if current == 0 {
        return 1.0;
    }
    match previous {
        None => 0.3,
        Some(prev) if current < prev => 0.7,
        Some(prev) if current == prev => 0.4,
        Some(_) => 0.1,
    }
}

/// Blocker keywords present in the round's questions and actions.
pub fn detect_blockers(questions: &[&str], actions: &[&str]) -> Vec<&'static str> {
    let text = questions
        .iter()
        .chain(actions.iter())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");
    BLOCKER_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect()
}

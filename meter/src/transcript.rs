//! Transcript model — the validated, typed view of a conversation the scorer consumes.
//!
//! Persisted transcripts are loosely shaped JSON. [`Transcript::from_value`]
//! enforces the parts the scorer relies on (a non-empty `rounds` list whose
//! entries carry an `outputs` object with a `claims` list) and is lenient
//! about everything else: optional lists default to empty and non-string
//! entries are dropped.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{MeterError, MeterResult};

/// A multi-round conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub version: Option<String>,
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub rounds: Vec<Round>,
    /// Free-form note carried over from a JSONL trace; never scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diminishing_returns_note: Option<Value>,
}

/// One discussion round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    /// Round number, when the source gave an integer marker.
    pub round: Option<i64>,
    pub outputs: Outputs,
}

/// Structured outputs produced by a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outputs {
    pub claims: Vec<String>,
    pub open_questions: Vec<String>,
    pub next_actions: Vec<String>,
    /// Recorded decisions. Not used by scoring.
    pub decisions: Vec<String>,
}

impl Transcript {
    /// Build a transcript directly from rounds.
    pub fn new(rounds: Vec<Round>) -> Self {
        Self {
            version: Some("0.1".to_string()),
            conversation_id: None,
            topic: None,
            rounds,
            diminishing_returns_note: None,
        }
    }

    /// Validate and convert a parsed JSON transcript.
    pub fn from_value(value: &Value) -> MeterResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| MeterError::structural("transcript must be a JSON object"))?;

        let raw_rounds = match obj.get("rounds") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(MeterError::structural(
                    "transcript must contain a non-empty 'rounds' list",
                ))
            }
        };

        let rounds = raw_rounds
            .iter()
            .enumerate()
            .map(|(idx, raw)| Round::from_value(idx, raw))
            .collect::<MeterResult<Vec<_>>>()?;

        Ok(Self {
            version: obj.get("version").and_then(scalar_string),
            conversation_id: obj.get("conversation_id").and_then(scalar_string),
            topic: obj.get("topic").and_then(scalar_string),
            rounds,
            diminishing_returns_note: obj
                .get("diminishing_returns_note")
                .filter(|v| !v.is_null())
                .cloned(),
        })
    }

    /// Fail unless the transcript has at least one round.
    pub fn ensure_rounds(&self) -> MeterResult<()> {
        if self.rounds.is_empty() {
            return Err(MeterError::structural(
                "transcript must contain a non-empty 'rounds' list",
            ));
        }
        Ok(())
    }
}

impl Round {
    pub fn new(round: Option<i64>, outputs: Outputs) -> Self {
        Self { round, outputs }
    }

    fn from_value(idx: usize, value: &Value) -> MeterResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            MeterError::structural(format!("round at index {} is not an object", idx))
        })?;

        let outputs = match obj.get("outputs") {
            Some(Value::Object(map)) => Outputs::from_map(idx, map)?,
            _ => {
                return Err(MeterError::structural(format!(
                    "round at index {}: 'outputs' must be an object",
                    idx
                )))
            }
        };

        Ok(Self {
            round: obj.get("round").and_then(Value::as_i64),
            outputs,
        })
    }
}

impl Outputs {
    /// Outputs carrying only claims.
    pub fn with_claims<S: Into<String>>(claims: impl IntoIterator<Item = S>) -> Self {
        Self {
            claims: claims.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    fn from_map(idx: usize, map: &Map<String, Value>) -> MeterResult<Self> {
        let claims = match map.get("claims") {
            Some(Value::Array(items)) => string_list(idx, "claims", items),
            _ => {
                return Err(MeterError::structural(format!(
                    "round at index {}: 'outputs.claims' must be a list",
                    idx
                )))
            }
        };

        Ok(Self {
            claims,
            open_questions: optional_list(idx, "open_questions", map),
            next_actions: optional_list(idx, "next_actions", map),
            decisions: optional_list(idx, "decisions", map),
        })
    }
}

fn optional_list(idx: usize, field: &str, map: &Map<String, Value>) -> Vec<String> {
    match map.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => string_list(idx, field, items),
        Some(_) => {
            warn!(round_index = idx, field, "ignoring non-list optional field");
            Vec::new()
        }
    }
}

fn string_list(idx: usize, field: &str, items: &[Value]) -> Vec<String> {
    let out: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    let dropped = items.len() - out.len();
    if dropped > 0 {
        warn!(round_index = idx, field, dropped, "dropped non-string entries");
    }
    out
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_optional_fields() {
        let t = Transcript::from_value(&json!({
            "version": "0.1",
            "conversation_id": "c-1",
            "rounds": [
                {"round": 1, "outputs": {
                    "claims": ["A", 7, null, "B"],
                    "open_questions": ["why?"],
                    "next_actions": ["run tests"]
                }}
            ]
        }))
        .unwrap();

        assert_eq!(t.conversation_id.as_deref(), Some("c-1"));
        assert_eq!(t.rounds[0].round, Some(1));
        assert_eq!(t.rounds[0].outputs.claims, vec!["A", "B"]);
        assert_eq!(t.rounds[0].outputs.open_questions, vec!["why?"]);
        assert!(t.rounds[0].outputs.decisions.is_empty());
    }

    #[test]
    fn test_rejects_missing_and_empty_rounds() {
        let err = Transcript::from_value(&json!({"version": "0.1"})).unwrap_err();
        assert!(err.is_structural());
        let err = Transcript::from_value(&json!({"rounds": []})).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_rejects_non_object_round() {
        let err = Transcript::from_value(&json!({"rounds": ["nope"]})).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_rejects_non_object_outputs() {
        let err =
            Transcript::from_value(&json!({"rounds": [{"round": 1, "outputs": []}]})).unwrap_err();
        assert!(err.to_string().contains("'outputs'"));
    }

    #[test]
    fn test_rejects_missing_claims_list() {
        let err = Transcript::from_value(&json!({
            "rounds": [{"outputs": {"claims": ["ok"]}}, {"outputs": {"claims": "not a list"}}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("index 1"));
        assert!(err.to_string().contains("claims"));
    }

    #[test]
    fn test_non_integer_round_marker_is_none() {
        let t = Transcript::from_value(&json!({
            "rounds": [{"round": "two", "outputs": {"claims": []}}]
        }))
        .unwrap();
        assert_eq!(t.rounds[0].round, None);
    }
}

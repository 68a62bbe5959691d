//! Transcript loader — reads JSON transcripts and JSONL event traces from disk.
//!
//! `.jsonl` files are event streams:
//!
//! ```text
//! {"type":"transcript_header","version":"0.1","conversation_id":"..."}
//! {"type":"round","round":1,"outputs":{"claims":[...]}}
//! {"type":"diminishing_returns_note", ...}        (optional)
//! ```
//!
//! Anything else is read as a single JSON transcript object. Either way the
//! rounds are sorted by their integer `round` marker before validation.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MeterError, MeterResult};
use crate::transcript::Transcript;

/// Load and validate a transcript file.
pub fn load_transcript(path: &Path) -> MeterResult<Transcript> {
    let raw = load_raw(path)?;
    Transcript::from_value(&raw)
}

/// Load a transcript file into its canonical JSON shape without validating it.
pub fn load_raw(path: &Path) -> MeterResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MeterError::parse_in(path, "transcript not found")
        } else {
            MeterError::parse_in(path, format!("failed to read transcript: {}", e))
        }
    })?;

    let is_jsonl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        parse_jsonl(path, &text)
    } else {
        parse_json(path, &text)
    }
}

/// Parse a JSONL event stream into the canonical transcript shape.
pub fn parse_jsonl(path: &Path, text: &str) -> MeterResult<Value> {
    let mut events: Vec<Map<String, Value>> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: Value = serde_json::from_str(line)
            .map_err(|e| MeterError::parse_at(path, idx + 1, format!("invalid JSONL: {}", e)))?;
        match parsed {
            Value::Object(obj) => events.push(obj),
            _ => {
                return Err(MeterError::parse_at(
                    path,
                    idx + 1,
                    "invalid JSONL event: expected an object",
                ))
            }
        }
    }

    let header = events
        .iter()
        .find(|e| event_type(e) == Some("transcript_header"));

    let mut rounds: Vec<Value> = events
        .iter()
        .filter(|e| event_type(e) == Some("round"))
        .map(|e| {
            let outputs = match e.get("outputs") {
                None | Some(Value::Null) => Value::Object(Map::new()),
                Some(v) => v.clone(),
            };
            let mut round = Map::new();
            round.insert("round".into(), e.get("round").cloned().unwrap_or(Value::Null));
            round.insert("outputs".into(), outputs);
            Value::Object(round)
        })
        .collect();
    sort_rounds(&mut rounds);
    debug!(path = %path.display(), events = events.len(), rounds = rounds.len(), "parsed JSONL trace");

    let header_field = |key: &str| {
        header
            .and_then(|h| h.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let version = match header_field("version") {
        Value::Null => Value::String("0.1".into()),
        Value::String(s) if s.is_empty() => Value::String("0.1".into()),
        v => v,
    };

    let mut out = Map::new();
    out.insert("version".into(), version);
    out.insert("conversation_id".into(), header_field("conversation_id"));
    out.insert("topic".into(), header_field("topic"));
    out.insert("rounds".into(), Value::Array(rounds));

    if let Some(note) = events
        .iter()
        .find(|e| event_type(e) == Some("diminishing_returns_note"))
    {
        let mut note = note.clone();
        note.remove("type");
        out.insert("diminishing_returns_note".into(), Value::Object(note));
    }

    Ok(Value::Object(out))
}

fn event_type(event: &Map<String, Value>) -> Option<&str> {
    event.get("type").and_then(Value::as_str)
}

/// Parse a JSON transcript object, sorting its rounds when they are all objects.
pub fn parse_json(path: &Path, text: &str) -> MeterResult<Value> {
    let mut transcript: Value = serde_json::from_str(text)
        .map_err(|e| MeterError::parse_at(path, e.line(), format!("invalid JSON: {}", e)))?;

    let obj = transcript.as_object_mut().ok_or_else(|| {
        MeterError::parse_in(path, "invalid JSON transcript: expected a top-level object")
    })?;

    if let Some(Value::Array(rounds)) = obj.get_mut("rounds") {
        if rounds.iter().all(Value::is_object) {
            sort_rounds(rounds);
        }
    }

    Ok(transcript)
}

/// Stable sort: integer round markers ascending, everything else after them in input order.
pub fn sort_rounds(rounds: &mut [Value]) {
    rounds.sort_by_key(|r| match r.get("round").and_then(Value::as_i64) {
        Some(n) => (0, n),
        None => (1, 0),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_numbers(value: &Value) -> Vec<Value> {
        value["rounds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["round"].clone())
            .collect()
    }

    #[test]
    fn test_sort_rounds_puts_non_integers_last() {
        let mut rounds = vec![
            json!({"round": "x"}),
            json!({"round": 2}),
            json!({}),
            json!({"round": 1}),
        ];
        sort_rounds(&mut rounds);
        assert_eq!(rounds[0]["round"], 1);
        assert_eq!(rounds[1]["round"], 2);
        assert_eq!(rounds[2]["round"], "x");
        assert!(rounds[3].get("round").is_none());
    }

    #[test]
    fn test_jsonl_header_and_note() {
        let text = [
            r#"{"type":"transcript_header","conversation_id":"c-9","topic":"caching"}"#,
            "",
            r#"{"type":"round","round":2,"outputs":{"claims":["B"]}}"#,
            r#"{"type":"round","round":1,"outputs":{"claims":["A"]}}"#,
            r#"{"type":"diminishing_returns_note","text":"felt done"}"#,
        ]
        .join("\n");
        let value = parse_jsonl(Path::new("t.jsonl"), &text).unwrap();
        assert_eq!(value["version"], "0.1");
        assert_eq!(value["conversation_id"], "c-9");
        assert_eq!(value["topic"], "caching");
        assert_eq!(round_numbers(&value), vec![json!(1), json!(2)]);
        assert_eq!(value["diminishing_returns_note"], json!({"text": "felt done"}));
    }

    #[test]
    fn test_jsonl_round_without_outputs_fails_validation() {
        let text = r#"{"type":"round","round":1}"#;
        let value = parse_jsonl(Path::new("t.jsonl"), text).unwrap();
        assert_eq!(value["rounds"][0]["outputs"], json!({}));
        assert!(Transcript::from_value(&value).unwrap_err().is_structural());
    }

    #[test]
    fn test_jsonl_non_object_line() {
        let err = parse_jsonl(Path::new("t.jsonl"), "{\"type\":\"round\"}\n[1,2]\n").unwrap_err();
        assert!(err.to_string().starts_with("t.jsonl:2: "));
    }

    #[test]
    fn test_json_mixed_rounds_left_unsorted() {
        let text = r#"{"rounds":[{"round":2,"outputs":{"claims":[]}},"bad",{"round":1}]}"#;
        let value = parse_json(Path::new("t.json"), text).unwrap();
        assert_eq!(value["rounds"][0]["round"], 2);
    }

    #[test]
    fn test_json_top_level_must_be_object() {
        let err = parse_json(Path::new("t.json"), "[1]").unwrap_err();
        assert!(!err.is_structural());
        assert!(err.to_string().contains("top-level object"));
    }
}

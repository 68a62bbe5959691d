//! Loader integration tests against real files on disk.

use std::path::Path;

use meter::{load_transcript, score_transcript, MeterError};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn round_markers(transcript: &meter::Transcript) -> Vec<Option<i64>> {
    transcript.rounds.iter().map(|r| r.round).collect()
}

#[test]
fn test_jsonl_rounds_sorted_by_round_number() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "trace.jsonl",
        concat!(
            r#"{"type":"transcript_header","version":"0.1","conversation_id":"ordered"}"#,
            "\n",
            r#"{"type":"round","round":2,"outputs":{"claims":["B"]}}"#,
            "\n",
            r#"{"type":"round","round":1,"outputs":{"claims":["A"]}}"#,
            "\n",
        ),
    );

    let transcript = load_transcript(&path).unwrap();
    assert_eq!(round_markers(&transcript), vec![Some(1), Some(2)]);
    assert_eq!(transcript.conversation_id.as_deref(), Some("ordered"));
    assert_eq!(transcript.rounds[0].outputs.claims, vec!["A"]);
}

#[test]
fn test_jsonl_parse_error_reports_line_number() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "trace.jsonl",
        "{\"type\":\"round\",\"round\":1,\"outputs\":{\"claims\":[\"A\"]}}\nnot-json\n",
    );

    let err = load_transcript(&path).unwrap_err();
    assert!(matches!(err, MeterError::Parse { .. }));
    assert!(err.to_string().contains("trace.jsonl:2"), "{}", err);
}

#[test]
fn test_json_rounds_sorted_by_round_number() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "transcript.json",
        r#"{
            "version": "0.1",
            "conversation_id": "ordered-json",
            "rounds": [
                {"round": 3, "outputs": {"claims": ["C"]}},
                {"round": 1, "outputs": {"claims": ["A"]}},
                {"round": 2, "outputs": {"claims": ["B"]}}
            ]
        }"#,
    );

    let transcript = load_transcript(&path).unwrap();
    assert_eq!(round_markers(&transcript), vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn test_json_parse_error_reports_file_and_line() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.json", "{\"version\":\"0.1\"\n");

    let err = load_transcript(&path).unwrap_err();
    assert!(matches!(err, MeterError::Parse { .. }));
    assert!(err.to_string().contains("bad.json:2"), "{}", err);
}

#[test]
fn test_missing_file_is_parse_error_at_path() {
    let err = load_transcript(Path::new("/nonexistent/dr/meeting.json")).unwrap_err();
    assert!(!err.is_structural());
    assert!(err.to_string().starts_with("/nonexistent/dr/meeting.json: "));
}

#[test]
fn test_structurally_invalid_file_is_structural_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.json", r#"{"version":"0.1","rounds":[]}"#);

    let err = load_transcript(&path).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn test_jsonl_trace_scores_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "meeting.jsonl",
        concat!(
            r#"{"type":"transcript_header","version":"0.1","conversation_id":"standup","topic":"release"}"#,
            "\n\n",
            r#"{"type":"round","round":1,"outputs":{"claims":["Tag v1.2 from main"],"next_actions":["Run the release checklist"]}}"#,
            "\n",
            r#"{"type":"round","round":2,"outputs":{"claims":["Tag v1.2 from main."],"next_actions":["Run the release checklist"]}}"#,
            "\n",
            r#"{"type":"diminishing_returns_note","text":"same plan twice"}"#,
            "\n",
        ),
    );

    let transcript = load_transcript(&path).unwrap();
    assert_eq!(transcript.topic.as_deref(), Some("release"));
    assert!(transcript.diminishing_returns_note.is_some());

    let result = score_transcript(&transcript).unwrap();
    assert_eq!(result.conversation_id.as_deref(), Some("standup"));
    assert_eq!(result.novelty_by_round.len(), 2);
    assert_eq!(result.components.novelty_rate, 0.0);
}

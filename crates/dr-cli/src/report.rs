//! Condensed human-readable stop report.
//!
//! ```text
//! Signal: SHIP
//! Why:
//! - Novelty is LOW (1 trailing low-novelty round).
//! - Readiness is HIGH.
//! - Novelty rate 0 (L0 0, L1 0), action readiness 1.
//! Next action:
//! - run verification
//! ```

use std::fmt::Write;
use std::path::Path;

use meter::{MeterError, ScoreResult};

/// Bullets shown under `Why:`.
const WHY_BULLETS: usize = 3;

/// Rationale sentences first, then component figures until there are three bullets.
pub fn why_bullets(result: &ScoreResult) -> Vec<String> {
    let c = &result.components;
    let fallback = [
        format!(
            "Novelty rate {} (L0 {}, L1 {}), action readiness {}.",
            c.novelty_rate, c.novelty_rate_l0, c.novelty_rate_l1, c.action_readiness
        ),
        format!("Stop-worthiness score {}.", result.score),
    ];

    result
        .stop_recommendation
        .reasons
        .iter()
        .cloned()
        .chain(fallback)
        .take(WHY_BULLETS)
        .collect()
}

/// Render the `stop` report. Always ends with a newline.
pub fn render_stop_report(result: &ScoreResult) -> String {
    let signal = result.stop_recommendation.signal;
    let mut out = String::new();
    let _ = writeln!(out, "Signal: {}", signal);
    let _ = writeln!(out, "Why:");
    for bullet in why_bullets(result) {
        let _ = writeln!(out, "- {}", bullet);
    }
    let _ = writeln!(out, "Next action:");
    let _ = writeln!(out, "- {}", signal.next_action());
    out
}

/// One-line `error: <source>: <message>` diagnostic.
///
/// Structural errors name the transcript path; parse errors already carry
/// their `path[:line]` location.
pub fn render_error(err: &anyhow::Error, path: &Path) -> String {
    let text = match err.downcast_ref::<MeterError>() {
        Some(MeterError::Structural(message)) => format!("{}: {}", path.display(), message),
        Some(parse @ MeterError::Parse { .. }) => parse.to_string(),
        None => format!("{:#}", err),
    };
    let single_line = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("error: {}", single_line)
}

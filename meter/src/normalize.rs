//! Claim normalization.
//!
//! Canonicalizes free-text claims so bullets, numbering, casing, spacing and
//! trailing punctuation do not register as novelty.

use std::collections::BTreeSet;

/// Characters stripped from the start of a claim (bullets, list numbering, stray punctuation).
fn is_leading_noise(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_digit()
        || matches!(
            c,
            '-' | '*' | '•' | '·' | '(' | ')' | ':' | '.' | ',' | '_' | ';' | '!' | '?'
        )
}

/// Characters trimmed from either end after collapsing.
/// Must stay a subset of [`is_leading_noise`] for normalization to be idempotent.
fn is_edge_noise(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | '!' | '?' | ',' | ';' | ':' | '-' | '*' | '_' | '•' | '·'
        )
}

/// Normalize one raw claim. Returns an empty string when nothing meaningful remains.
pub fn normalize_claim(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered.trim_start_matches(is_leading_noise);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['.', '!', '?'])
        .trim_matches(is_edge_noise)
        .to_string()
}

/// Normalize a round's claims: drop empties, dedupe, sort.
pub fn normalize_claims<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|c| normalize_claim(c.as_ref()))
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bullets_and_numbering() {
        assert_eq!(normalize_claim("- Cache the index"), "cache the index");
        assert_eq!(normalize_claim("  2) Use   Redis. "), "use redis");
        assert_eq!(normalize_claim("• 1. Ship it!!"), "ship it");
        assert_eq!(normalize_claim("**Bold claim**"), "bold claim");
    }

    #[test]
    fn test_empty_after_noise() {
        assert_eq!(normalize_claim("  --- 12. "), "");
        assert_eq!(normalize_claim(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "- Cache the index",
            "; 5 apples?",
            "(a) First option.",
            "  Ends with colon:  ",
            "Mixed   CASE   spacing!?",
            "__init__ handles setup",
            "• bullet — with dash",
        ];
        for raw in samples {
            let once = normalize_claim(raw);
            assert_eq!(normalize_claim(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_round_claims_deduped_and_sorted() {
        let claims = normalize_claims(&["B", "A", "A", "  a  ", "", "--"]);
        assert_eq!(claims, vec!["a", "b"]);
    }

    #[test]
    fn test_order_independent() {
        let a = normalize_claims(&["zeta", "alpha", "mid"]);
        let b = normalize_claims(&["mid", "zeta", "alpha"]);
        assert_eq!(a, b);
    }
}

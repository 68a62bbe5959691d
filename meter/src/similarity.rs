//! Token-set similarity for near-duplicate claim detection.
//!
//! Claims are reduced to sets of canonical tokens: alphanumeric/underscore
//! runs, minus stopwords, with common inflections and a few domain synonyms
//! folded onto one representative form. Similarity is the Jaccard index of
//! two such sets.

use std::collections::BTreeSet;

/// Canonical token set of a claim.
pub type TokenSet = BTreeSet<String>;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "at", "for", "with", "by",
    "from", "as", "into", "over", "via", "per", "is", "are", "was", "were", "be", "been",
    "being", "it", "its", "this", "that", "these", "those", "we", "our", "us", "you", "your",
    "they", "them", "their", "i", "he", "she", "will", "would", "should", "can", "could",
    "may", "must", "do", "does", "did", "has", "have", "had", "so", "than", "then", "also",
    "all", "any", "more", "most", "very", "just", "if", "there", "which", "what", "who",
];

/// Domain synonyms folded before and after suffix stripping.
fn synonym(token: &str) -> Option<&'static str> {
    let canonical = match token {
        "caching" | "cached" | "caches" => "cache",
        "speed" | "speeds" | "faster" | "fastest" | "quick" | "quicker" | "quickly" | "rapid" => {
            "fast"
        }
        "slower" | "slowest" | "sluggish" => "slow",
        "db" | "dbs" | "databases" => "database",
        "configuration" | "configurations" | "settings" | "setting" => "config",
        "utilize" | "utilise" | "leverage" => "use",
        "decrease" | "decreases" | "lower" | "lowers" | "shrink" => "reduce",
        "boost" | "boosts" | "enhance" | "enhances" => "improve",
        _ => return None,
    };
    Some(canonical)
}

/// Fold plural/"-ing"/"-ed" endings.
fn strip_suffix(token: &str) -> &str {
    let len = token.len();
    if len > 5 {
        if let Some(stem) = token.strip_suffix("ing") {
            return stem;
        }
    }
    if len > 4 {
        if let Some(stem) = token.strip_suffix("ed") {
            return stem;
        }
        if let Some(stem) = token.strip_suffix("es") {
            if ["x", "ch", "sh", "ss", "z"].iter().any(|end| stem.ends_with(end)) {
                return stem;
            }
        }
    }
    if len > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") {
        return &token[..len - 1];
    }
    token
}

/// Canonical form of a single lower-cased token.
pub fn canonical_token(token: &str) -> String {
    if let Some(syn) = synonym(token) {
        return syn.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies").filter(|s| s.len() > 1) {
        return format!("{}y", stem);
    }
    let stem = strip_suffix(token);
    synonym(stem).unwrap_or(stem).to_string()
}

/// Tokenize text into its canonical token set.
pub fn token_set(text: &str) -> TokenSet {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(canonical_token)
        .collect()
}

/// Jaccard similarity of two token sets. Two empty sets are identical.
pub fn token_similarity(a: &TokenSet, b: &TokenSet) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    let shared = a.intersection(b).count();
    let total = a.union(b).count();
    shared as f64 / total as f64
}

/// Convenience wrapper over raw strings.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    token_similarity(&token_set(a), &token_set(b))
}

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical form for free-text comparison: trimmed, whitespace removed, lowercased
pub fn normalize(answer: &str) -> String {
    WHITESPACE.replace_all(answer.trim(), "").to_lowercase()
}

pub fn answers_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// True if `input` equals any acceptable answer after normalization
pub fn matches_any<S: AsRef<str>>(input: &str, acceptable: &[S]) -> bool {
    let input = normalize(input);
    acceptable.iter().any(|a| normalize(a.as_ref()) == input)
}

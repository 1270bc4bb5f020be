//! Canonical comparison keys for free-text trivia answers.

use std::sync::LazyLock;

use regex::Regex;

static CONNECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) (?:and|&) ").expect("valid connective pattern"));
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word pattern"));
static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:the|an?) ").expect("valid article pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Reduce an answer to the key used to decide correctness.
///
/// Two answers are considered equal when their keys are equal. The result is a
/// fixed point: `normalize(&normalize(x)) == normalize(x)`. Blank or
/// punctuation-only input yields an empty key.
pub fn normalize(text: &str) -> String {
    let mut current = canonical_pass(text);
    loop {
        let next = canonical_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Whether a submitted attempt matches the stored answer.
pub fn answers_match(expected: &str, attempt: &str) -> bool {
    let expected = normalize(expected);
    !expected.is_empty() && expected == normalize(attempt)
}

fn canonical_pass(text: &str) -> String {
    let text = CONNECTIVE.replace_all(text, " ");
    let text = strip_markup(&text);
    let text = text.to_lowercase();
    let text = NON_WORD.replace_all(&text, "");
    let text = LEADING_ARTICLE.replace(&text, "");
    let text = text.replace('-', " ");
    // A doubled "ss" is part of the word, never a plural marker.
    let text = match text.strip_suffix('s') {
        Some(stem) if !stem.ends_with('s') => stem,
        _ => text.as_str(),
    };
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn strip_markup(text: &str) -> String {
    let text = MARKUP_TAG.replace_all(text, " ");
    ENTITIES
        .iter()
        .fold(text.into_owned(), |acc, (entity, plain)| acc.replace(entity, plain))
}

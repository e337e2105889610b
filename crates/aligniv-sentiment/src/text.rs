//! Text cleaning and tokenization shared by the scorer and the topic model.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid url regex"));
static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid non-alnum regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// English stop words dropped by [`tokenize`].
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "are", "as", "at", "be", "been", "but", "by",
    "can", "did", "do", "for", "from", "had", "has", "have", "he", "her", "his", "i", "in",
    "is", "it", "its", "just", "me", "my", "next", "of", "on", "or", "our", "out", "she", "so",
    "that", "the", "their", "them", "then", "there", "they", "this", "to", "today", "up", "was",
    "we", "were", "what", "when", "which", "who", "will", "with", "you", "your",
];

/// Lowercase, drop URLs, replace anything outside `[a-z0-9\s]` with a space,
/// and collapse runs of whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, "");
    let alnum = NON_ALNUM_RE.replace_all(&no_urls, " ");
    WHITESPACE_RE.replace_all(&alnum, " ").trim().to_string()
}

/// Split cleaned text into tokens, dropping stop words and single characters.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    clean_text(text)
        .split(' ')
        .filter(|t| t.len() > 1 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

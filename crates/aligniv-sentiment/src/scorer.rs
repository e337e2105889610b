//! Lexicon scorer for short social-media posts.

use crate::text::clean_text;

/// Word weights for everyday social-media chatter.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 0.6),
    ("awesome", 0.6),
    ("beautiful", 0.5),
    ("best", 0.6),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("excited", 0.5),
    ("fun", 0.4),
    ("good", 0.4),
    ("great", 0.5),
    ("happy", 0.5),
    ("incredible", 0.5),
    ("love", 0.6),
    ("loved", 0.6),
    ("nice", 0.4),
    ("superb", 0.6),
    ("win", 0.4),
    ("advancing", 0.2),
    ("fixed", 0.2),
    ("matters", 0.1),
    ("vibes", 0.2),
    // Negative signals
    ("angry", -0.5),
    ("bad", -0.4),
    ("boring", -0.4),
    ("bug", -0.2),
    ("crowded", -0.2),
    ("delays", -0.3),
    ("disappointed", -0.5),
    ("failed", -0.4),
    ("hate", -0.6),
    ("insane", -0.2),
    ("problem", -0.3),
    ("sad", -0.4),
    ("terrible", -0.6),
    ("tough", -0.3),
    ("worst", -0.6),
];

/// Score a text string using the lexicon.
///
/// Cleans the text, sums matching word weights, and clamps the result to
/// `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    let cleaned = clean_text(text);
    let mut score = 0.0_f64;
    for word in cleaned.split_whitespace() {
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == word) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

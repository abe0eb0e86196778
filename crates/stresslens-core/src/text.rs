//! Text normalisation applied to every input before vectorisation.
//!
//! Must match the cleaning the vectorizer was fitted on, otherwise terms
//! silently fall out of the vocabulary.
//!
//! # Steps
//!
//! 1. Lowercase
//! 2. Drop URLs (`http` followed by a non-whitespace run)
//! 3. Drop @-mentions (`@` followed by word characters)
//! 4. Drop hashtags (`#` followed by `[A-Za-z0-9_]`)
//! 5. Replace anything outside `[a-z0-9' ]` and whitespace with a space
//! 6. Collapse whitespace runs and trim

use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_]+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s']").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalise raw input text into the cleaned token string the vectorizer expects.
///
/// Output only contains `[a-z0-9' ]`, never has two consecutive spaces, and
/// never starts or ends with a space. Idempotent.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();
    let text = URL.replace_all(&text, "");
    let text = MENTION.replace_all(&text, "");
    let text = HASHTAG.replace_all(&text, "");
    let text = DISALLOWED.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// True when `text` has nothing but whitespace.
///
/// Counts the ASCII separators `\x1c`..=`\x1f` as whitespace too, unlike
/// [`char::is_whitespace`].
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

//! Text Normalizer (C1, §4.1): strips mentions/hashtags/URLs, collapses
//! whitespace, and extracts meaningful search terms. Stateless — there is
//! nothing here to construct, only functions to call.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static DISALLOWED_CHAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9 .,!?-]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for"]
        .into_iter()
        .collect()
});

/// Strip `@handles`, `#tags`, and URLs; drop any character outside
/// `[A-Za-z0-9 .,!?-]`; collapse runs of whitespace to a single space.
///
/// Never fails on well-formed input; an empty string yields an empty string.
pub fn clean(text: &str) -> String {
    let without_mentions = MENTION_RE.replace_all(text, "");
    let without_hashtags = HASHTAG_RE.replace_all(&without_mentions, "");
    let without_urls = URL_RE.replace_all(&without_hashtags, "");
    let allowed_only = DISALLOWED_CHAR_RE.replace_all(&without_urls, "");
    WHITESPACE_RE.replace_all(&allowed_only, " ").trim().to_string()
}

/// Lowercase tokens from the cleaned text, stopwords removed, duplicates
/// collapsed while preserving first-seen order.
pub fn terms(text: &str) -> Vec<String> {
    let cleaned = clean(text).to_lowercase();
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for token in cleaned.split_whitespace() {
        let trimmed: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
        if trimmed.is_empty() || STOPWORDS.contains(trimmed.as_str()) {
            continue;
        }
        if seen.insert(trimmed.clone()) {
            ordered.push(trimmed);
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_mentions_hashtags_and_urls() {
        let input = "Hey @nitk_official check out #NITKPride at https://nitk.ac.in now!";
        let cleaned = clean(input);
        assert!(!cleaned.contains('@'));
        assert!(!cleaned.contains('#'));
        assert!(!cleaned.contains("https"));
        assert_eq!(cleaned, "Hey check out at now!");
    }

    #[test]
    fn clean_collapses_whitespace_and_strips_disallowed_chars() {
        assert_eq!(clean("Who   is\tthe  director??  ~~~"), "Who is the director??");
    }

    #[test]
    fn clean_on_empty_input_is_empty() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn clean_is_a_fixed_point_on_already_clean_text() {
        let already_clean = "Who is the director of NITK?";
        assert_eq!(clean(already_clean), already_clean);
    }

    #[test]
    fn terms_removes_stopwords_and_dedupes_preserving_order() {
        let extracted = terms("What is the latest news about the NITK director and the NITK campus");
        assert_eq!(extracted, vec!["what", "is", "latest", "news", "about", "nitk", "director", "campus"]);
    }

    #[test]
    fn terms_on_empty_input_is_empty() {
        assert!(terms("").is_empty());
    }
}

//! Temporal Classifier (C3, §4.3): decides whether a question needs
//! up-to-date information the institutional knowledge base cannot provide,
//! routing it to the external current-information provider instead of RAG.

use once_cell::sync::Lazy;
use regex::Regex;

const TEMPORAL_KEYWORDS: &[&str] = &["latest", "recent", "current", "new", "now", "today", "this year"];

const STATUS_KEYWORDS: &[&str] = &["updates", "announcements", "changes", "progress", "news"];

const RELATIVE_TIME_KEYWORDS: &[&str] = &["last month", "past year", "recently announced"];

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    let all: Vec<&str> = TEMPORAL_KEYWORDS
        .iter()
        .chain(STATUS_KEYWORDS.iter())
        .chain(RELATIVE_TIME_KEYWORDS.iter())
        .copied()
        .collect();
    let pattern = all
        .iter()
        .map(|kw| regex::escape(kw))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({pattern})\b")).unwrap()
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

/// Returns true if `question` should be answered from current, external
/// information rather than the (necessarily stale) knowledge base. Matches
/// either a temporal/status/relative-time keyword, or a four-digit year
/// within `year_window` of `current_year`.
pub fn needs_current(question: &str, current_year: i32, year_window: i32) -> bool {
    if KEYWORD_RE.is_match(question) {
        return true;
    }

    YEAR_RE.captures_iter(question).any(|cap| {
        cap[1]
            .parse::<i32>()
            .map(|year| (year - current_year).abs() <= year_window)
            .unwrap_or(false)
    })
}

/// What `needs_current` matched and why, for the `/stats` introspection
/// endpoint (§6.1): the keywords found in `question` and any in-range
/// years, plus the active year window used for the check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemporalDetection {
    pub matched_keywords: Vec<String>,
    pub matched_years: Vec<i32>,
    pub year_window: i32,
    pub needs_current: bool,
}

pub fn detection_info(question: &str, current_year: i32, year_window: i32) -> TemporalDetection {
    let matched_keywords: Vec<String> = TEMPORAL_KEYWORDS
        .iter()
        .chain(STATUS_KEYWORDS.iter())
        .chain(RELATIVE_TIME_KEYWORDS.iter())
        .filter(|kw| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(kw));
            Regex::new(&pattern).map(|re| re.is_match(question)).unwrap_or(false)
        })
        .map(|kw| kw.to_string())
        .collect();

    let matched_years: Vec<i32> = YEAR_RE
        .captures_iter(question)
        .filter_map(|cap| cap[1].parse::<i32>().ok())
        .filter(|year| (year - current_year).abs() <= year_window)
        .collect();

    let needs_current = !matched_keywords.is_empty() || !matched_years.is_empty();

    TemporalDetection {
        matched_keywords,
        matched_years,
        year_window,
        needs_current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_temporal_keyword() {
        assert!(needs_current("what's happening today on campus", 2026, 1));
    }

    #[test]
    fn detects_status_keyword() {
        assert!(needs_current("any updates on the hostel allotment", 2026, 1));
    }

    #[test]
    fn detects_year_within_window() {
        assert!(needs_current("what events are planned for 2027", 2026, 1));
    }

    #[test]
    fn rejects_year_outside_window() {
        assert!(!needs_current("what happened during the 2015 convocation", 2026, 1));
    }

    #[test]
    fn rejects_plain_factual_question() {
        assert!(!needs_current("who is the director of the institute", 2026, 1));
    }

    #[test]
    fn keyword_match_is_word_bounded() {
        assert!(!needs_current("nowhere to be found", 2026, 1));
    }

    #[test]
    fn detection_info_reports_matched_keywords_and_years() {
        let info = detection_info("any updates on the 2027 convocation", 2026, 1);
        assert!(info.needs_current);
        assert!(info.matched_keywords.contains(&"updates".to_string()));
        assert_eq!(info.matched_years, vec![2027]);
        assert_eq!(info.year_window, 1);
    }

    #[test]
    fn detection_info_is_empty_for_plain_factual_question() {
        let info = detection_info("who is the director of the institute", 2026, 1);
        assert!(!info.needs_current);
        assert!(info.matched_keywords.is_empty());
        assert!(info.matched_years.is_empty());
    }
}

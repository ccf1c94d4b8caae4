//! System prompt template (§6.3): a single multi-line template parameterized
//! by `current_date`, with a format-specific instruction block appended by
//! the caller. The template never asks the model for an emotion label — that
//! is produced post-hoc by the orchestrator (§4.7.2).

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::{America, Asia, Tz};
use query_engine_core::ResponseFormat;

/// Renders the base institutional system prompt for a given date. Kept
/// separate from the format instruction so the orchestrator can append a
/// different block for the RAG path (§4.7.1) than for the external-provider
/// path (§4.7.3, which also needs multi-timezone context).
pub fn system_prompt(current_date: NaiveDate) -> String {
    format!(
        "You are the official knowledge assistant for a technical institution. \
Today's date is {date}.

You must never make a tense error: describe anything dated before {date} in \
the past tense, and anything dated after {date} in the future tense. Never \
use a vague time reference such as \"recently\", \"soon\", or \"currently\" \
when the context gives you an explicit date — state the date instead.

If the provided context does not contain enough information to answer \
confidently, say so plainly rather than guessing. Do not invent facts, dates, \
names, or figures that are not present in the context.",
        date = current_date.format("%B %-d, %Y")
    )
}

/// The format-specific instruction block appended to the base prompt for the
/// RAG path (§4.7.1, §6.3).
pub fn format_instruction(format: ResponseFormat) -> String {
    let (min_words, max_words) = format.word_budget();
    match format {
        ResponseFormat::Web => format!(
            "Write a {min_words}-{max_words} word answer in structured prose. \
Bullet points are permitted where they improve clarity."
        ),
        ResponseFormat::Voice => format!(
            "Write a {min_words}-{max_words} word answer in short, conversational \
sentences suitable for being read aloud. Do not use bullet points, headings, \
or markdown."
        ),
    }
}

/// Multi-timezone context block for the external current-information
/// provider path (§4.7.3) — the provider has no institutional grounding, so
/// it needs the current time made explicit across the zones our users are
/// likely in, plus a format-specific opening-phrase and word-budget
/// instruction of its own (distinct from the RAG path's `format_instruction`,
/// since this path answers without retrieved context).
pub fn provider_system_prompt(now: DateTime<Utc>, format: ResponseFormat) -> String {
    let zones: [(&str, Tz); 4] = [
        ("UTC", chrono_tz::UTC),
        ("India (IST)", Asia::Kolkata),
        ("US Eastern", America::New_York),
        ("US Pacific", America::Los_Angeles),
    ];

    let times = zones
        .iter()
        .map(|(label, tz)| format!("- {label}: {}", now.with_timezone(tz).format("%B %d, %Y at %I:%M %p")))
        .collect::<Vec<_>>()
        .join("\n");

    let (min_words, max_words) = format.provider_word_budget();
    let (opening, style) = match format {
        ResponseFormat::Voice => (
            "Based on current information...",
            format!("Answer in {min_words}-{max_words} words of short, conversational sentences suitable for being read aloud. Do not use bullet points, headings, or markdown."),
        ),
        ResponseFormat::Web => (
            "Based on current web information...",
            format!("Answer in {min_words}-{max_words} words of structured prose. Bullet points are permitted where they improve clarity."),
        ),
    };

    format!(
        "You answer questions using the most current information available. \
The current date and time in several timezones:
{times}

Do not assume the user's timezone: always name the timezone alongside any \
time or date you state, and prefer the zone most relevant to the question \
(e.g. India time for a campus event, US Eastern for a US announcement). \
Cite your sources in prose rather than with inline reference markers — never \
write bracketed citation numbers like [1].

Begin your answer with \"{opening}\". {style}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_never_requests_an_emotion_label() {
        let prompt = system_prompt(NaiveDate::from_ymd_opt(2026, 7, 28).unwrap());
        assert!(!prompt.to_lowercase().contains("emotion"));
    }

    #[test]
    fn format_instruction_matches_word_budget() {
        assert!(format_instruction(ResponseFormat::Web).contains("150-300"));
        assert!(format_instruction(ResponseFormat::Voice).contains("50-80"));
    }

    #[test]
    fn provider_prompt_names_all_four_timezones() {
        let now = Utc::now();
        let prompt = provider_system_prompt(now, ResponseFormat::Web);
        assert!(prompt.contains("UTC"));
        assert!(prompt.contains("India (IST)"));
        assert!(prompt.contains("US Eastern"));
        assert!(prompt.contains("US Pacific"));
    }

    #[test]
    fn provider_prompt_opening_phrase_differs_by_format() {
        let now = Utc::now();
        assert!(provider_system_prompt(now, ResponseFormat::Voice).contains("Based on current information..."));
        assert!(provider_system_prompt(now, ResponseFormat::Web).contains("Based on current web information..."));
    }

    #[test]
    fn provider_prompt_never_requests_inline_citations() {
        let prompt = provider_system_prompt(Utc::now(), ResponseFormat::Web);
        assert!(prompt.to_lowercase().contains("never write bracketed citation"));
    }
}

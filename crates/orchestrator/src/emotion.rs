//! Emotion labeling (§4.7.2): a deterministic, content-based classifier that
//! scans the completed answer for keyword groups in a fixed priority order,
//! falling back to the original question when the answer itself is neutral.

use query_engine_core::Emotion;

/// Ordered `(keywords, label)` groups scanned against the lowercased answer.
/// Priority is positional: the first group with any keyword present wins,
/// regardless of how many keywords from a later group also match.
const ANSWER_GROUPS: &[(&[&str], Emotion)] = &[
    (&["congratulations", "excellent", "wonderful", "amazing", "fantastic"], Emotion::Happy),
    (&["exciting", "thrilled", "incredible"], Emotion::Excited),
    (&["sorry", "unfortunately", "problem", "issue", "error"], Emotion::Sad),
    (&["interesting", "surprising", "remarkable", "wow"], Emotion::Surprised),
    (&["unclear", "confusing", "not sure", "difficult to"], Emotion::Confused),
    (&["think", "consider", "analyze", "complex", "depends"], Emotion::Thinking),
];

const QUESTION_GROUPS: &[(&[&str], Emotion)] = &[
    (&["hello", "hi", "hey", "good morning", "good afternoon"], Emotion::Greeting),
    (&["bye", "goodbye", "see you", "farewell"], Emotion::Goodbye),
];

/// Detects the emotion to attach to a completed answer (§4.7.2). Scans
/// `answer` first; if nothing matches, falls back to `question`; otherwise
/// `Neutral`.
pub fn detect_emotion(answer: &str, question: &str) -> Emotion {
    let lower_answer = answer.to_lowercase();
    for (keywords, emotion) in ANSWER_GROUPS {
        if keywords.iter().any(|kw| lower_answer.contains(kw)) {
            return *emotion;
        }
    }

    let lower_question = question.to_lowercase();
    for (keywords, emotion) in QUESTION_GROUPS {
        if keywords.iter().any(|kw| lower_question.contains(kw)) {
            return *emotion;
        }
    }

    Emotion::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_outranks_later_groups_in_the_same_answer() {
        let emotion = detect_emotion("Congratulations, that's an interesting result.", "what happened");
        assert_eq!(emotion, Emotion::Happy);
    }

    #[test]
    fn sad_detected_on_apology_language() {
        assert_eq!(detect_emotion("Sorry, there was an issue retrieving that.", "q"), Emotion::Sad);
    }

    #[test]
    fn falls_back_to_question_greeting_when_answer_is_neutral() {
        let emotion = detect_emotion("The director is B. Ravi.", "Hey, who runs the institute?");
        assert_eq!(emotion, Emotion::Greeting);
    }

    #[test]
    fn falls_back_to_question_goodbye() {
        let emotion = detect_emotion("Thanks for visiting the site.", "Goodbye for now");
        assert_eq!(emotion, Emotion::Goodbye);
    }

    #[test]
    fn neutral_when_nothing_matches() {
        assert_eq!(detect_emotion("The director is B. Ravi.", "who is the director"), Emotion::Neutral);
    }

    #[test]
    fn thinking_detected_on_hedging_language() {
        assert_eq!(detect_emotion("It depends on the department you consider.", "q"), Emotion::Thinking);
    }
}

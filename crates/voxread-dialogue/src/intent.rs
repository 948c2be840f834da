//! Intent classification: an ordered decision list over a fixed lexicon.
//!
//! Matching is substring containment on normalized text, first hit wins.
//! Language triggers are checked before the intent table so "switch to hindi"
//! can never fall through to a generic keyword. There is no scoring and no
//! model: predictability over coverage, and correctness lives in the lexicon.

use crate::language;

/// Symbolic action derived from one recognized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartRead,
    Pause,
    Resume,
    Repeat,
    Next,
    Prev,
    Summarize,
    Explain,
    KeyPoints,
    Slower,
    Faster,
    Louder,
    Quieter,
    Clarify,
    Describe,
    ScanFiles,
    OpenFile,
    SetUsername,
    SetPassword,
    Greeting,
    Confirm,
    Deny,
    Logout,
    /// Carries the language registry key.
    ChangeLanguage(String),
    Unknown,
}

/// Ordered lexicon: earlier rows shadow later ones. Phrases are stored
/// normalized (see [`normalize`]).
static LEXICON: &[(Intent, &[&str])] = &[
    (Intent::StartRead, &["start reading", "begin reading", "read now", "padhna shuru"]),
    (Intent::Pause, &["pause", "stop", "wait", "hold on", "ruko"]),
    (Intent::Resume, &["resume", "continue", "go on", "carry on", "chaliye"]),
    (Intent::Repeat, &["repeat", "say again", "once more", "dobara", "phir se"]),
    (Intent::Next, &["next", "skip", "agle"]),
    (Intent::Prev, &["previous", "back", "peeche"]),
    (Intent::Summarize, &["summarize", "summary", "saransh"]),
    (Intent::Explain, &["explain", "simple words", "samjhao"]),
    (Intent::KeyPoints, &["important points", "key points", "highlights", "main points"]),
    (Intent::Slower, &["slower", "slow down", "dheere"]),
    (Intent::Faster, &["faster", "speed up", "jaldi"]),
    (Intent::Louder, &["louder", "volume up"]),
    (Intent::Quieter, &["quieter", "softer", "volume down", "lower volume"]),
    (Intent::Clarify, &["didnt understand", "not clear", "confused", "samjha nahi"]),
    (Intent::Describe, &["describe", "image", "picture", "diagram"]),
    (Intent::ScanFiles, &["scan documents", "list files", "scan", "show files", "list documents"]),
    (Intent::OpenFile, &["open", "load file", "choose", "select"]),
    (Intent::SetUsername, &["username", "user name", "my name is"]),
    (Intent::SetPassword, &["password", "pass word", "my password"]),
    (Intent::Greeting, &["hi", "hello", "hey", "ready"]),
    (Intent::Confirm, &["yes", "correct", "ok", "okay", "sure", "confirm", "right", "haan"]),
    (Intent::Deny, &["no", "wrong", "nope", "incorrect", "nahi"]),
    (Intent::Logout, &["logout", "log out", "exit", "bye", "goodbye", "quit", "close"]),
];

/// Lowercase, strip punctuation (apostrophes vanish, everything else becomes a
/// space), collapse whitespace.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' {
                None
            } else {
                Some(' ')
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map an utterance to one intent. Pure and deterministic.
pub fn classify(raw: &str) -> Intent {
    let text = normalize(raw);
    for lang in language::LANGUAGES {
        for trigger in lang.triggers {
            if text.contains(trigger) {
                return Intent::ChangeLanguage(lang.key.to_string());
            }
        }
    }
    for (intent, phrases) in LEXICON {
        for phrase in phrases.iter() {
            if text.contains(phrase) {
                return intent.clone();
            }
        }
    }
    Intent::Unknown
}

fn strip_fillers(text: &str, fillers: &[&str]) -> String {
    let mut padded = format!(" {text} ");
    for filler in fillers {
        let needle = format!(" {filler} ");
        while padded.contains(&needle) {
            padded = padded.replace(&needle, " ");
        }
    }
    padded.trim().to_string()
}

/// Username extraction: strip filler words, take the first remaining token.
/// Already lowercased by normalization. Empty means "could not hear a name".
pub fn extract_username(raw: &str) -> String {
    let stripped = strip_fillers(
        &normalize(raw),
        &["my name is", "user name", "name is", "username", "call me", "i am", "iam", "my", "is"],
    );
    stripped
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

const DIGIT_WORDS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
];

/// Password extraction: strip fillers, substitute spoken digit words, join the
/// remaining alphanumeric tokens.
pub fn extract_password(raw: &str) -> String {
    let stripped = strip_fillers(
        &normalize(raw),
        &["password is", "pass word", "my password", "password", "pass is", "my", "is"],
    );
    stripped
        .split_whitespace()
        .map(|token| {
            DIGIT_WORDS
                .iter()
                .find(|(word, _)| *word == token)
                .map(|(_, digit)| *digit)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .concat()
}

const ORDINALS: &[(&str, usize)] = &[
    ("first", 0),
    ("second", 1),
    ("third", 2),
    ("fourth", 3),
    ("fifth", 4),
];

/// A spoken list index: a standalone digit 1–9, or an ordinal word, as a
/// 0-based index.
pub fn extract_slot_number(raw: &str) -> Option<usize> {
    let text = normalize(raw);
    for token in text.split_whitespace() {
        if token.len() == 1 {
            if let Some(d) = token.chars().next().and_then(|c| c.to_digit(10)) {
                if d >= 1 {
                    return Some(d as usize - 1);
                }
            }
        }
        if let Some((_, idx)) = ORDINALS.iter().find(|(word, _)| *word == token) {
            return Some(*idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_deterministic() {
        assert_eq!(classify("Please, PAUSE!"), classify("please pause"));
    }

    #[test]
    fn language_trigger_beats_intent_keyword() {
        // "read" would otherwise never matter; "hindi" wins outright.
        assert_eq!(
            classify("switch to hindi and start reading"),
            Intent::ChangeLanguage("hindi".into())
        );
    }

    #[test]
    fn table_order_is_the_tiebreak() {
        // "stop" (Pause) appears before Deny's "no" can misfire on "now".
        assert_eq!(classify("stop now"), Intent::Pause);
        // "read now" hits StartRead before Pause sees anything.
        assert_eq!(classify("read now"), Intent::StartRead);
    }

    #[test]
    fn core_lexicon_hits() {
        assert_eq!(classify("hi"), Intent::Greeting);
        assert_eq!(classify("start reading"), Intent::StartRead);
        assert_eq!(classify("scan documents"), Intent::ScanFiles);
        assert_eq!(classify("open the science chapter"), Intent::OpenFile);
        assert_eq!(classify("didn't understand"), Intent::Clarify);
        assert_eq!(classify("volume down please"), Intent::Quieter);
        assert_eq!(classify("log out"), Intent::Logout);
        assert_eq!(classify("xyzzy plugh"), Intent::Unknown);
    }

    #[test]
    fn username_extraction() {
        assert_eq!(extract_username("my name is harini"), "harini");
        assert_eq!(extract_username("Username: Demo"), "demo");
        assert_eq!(extract_username("i am ARJUN kumar"), "arjun");
        assert_eq!(extract_username("my name is"), "");
    }

    #[test]
    fn password_extraction_substitutes_digit_words() {
        assert_eq!(extract_password("one two three four"), "1234");
        assert_eq!(extract_password("my password is demo"), "demo");
        assert_eq!(extract_password("pass word seven seven"), "77");
        assert_eq!(extract_password("password is"), "");
    }

    #[test]
    fn slot_numbers_and_ordinals() {
        assert_eq!(extract_slot_number("open number 3"), Some(2));
        assert_eq!(extract_slot_number("the first one"), Some(0));
        assert_eq!(extract_slot_number("open the fifth file"), Some(4));
        assert_eq!(extract_slot_number("open maths notes"), None);
    }
}

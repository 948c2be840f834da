//! Local derived-text heuristics: extractive summary, simplification, key
//! points, media descriptions, and a nearby-text answer.
//!
//! These are the fallback behind the remote digest collaborator, so they must
//! always produce something speakable, whatever the input.

use crate::chunker::split_sentences;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{4,}\b").unwrap());
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]{5,60}\)").unwrap());

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "can", "could",
    "in", "on", "at", "to", "for", "of", "and", "or", "but", "not", "with", "by", "from",
    "this", "that", "it", "its", "we", "i", "you", "he", "she", "they", "their",
];

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Most frequent non-stop-words, longest-standing tie broken alphabetically.
fn keywords(text: &str, top_n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for m in WORD.find_iter(&lowered) {
        let word = m.as_str();
        if !STOP_WORDS.contains(&word) {
            *freq.entry(word).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(w, _)| w.to_string())
        .collect()
}

/// Extractive summary: first and last sentences rank highest, keyword-dense
/// sentences fill the middle, document order is restored before joining.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return truncate_chars(text, 400);
    }
    if sentences.len() <= max_sentences {
        return text.trim().to_string();
    }
    let kws = keywords(text, 10);
    let mut scored: Vec<(f32, usize, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let pos_score = if i == 0 {
                1.0
            } else if i == sentences.len() - 1 {
                0.8
            } else {
                0.5
            };
            let lowered = sentence.to_lowercase();
            let hits = kws.iter().filter(|kw| lowered.contains(kw.as_str())).count();
            let kw_score = hits as f32 / (kws.len() + 1) as f32;
            (pos_score + kw_score, i, *sentence)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    let mut picked: Vec<(usize, &str)> = scored
        .into_iter()
        .take(max_sentences)
        .map(|(_, i, s)| (i, s))
        .collect();
    picked.sort_by_key(|(i, _)| *i);
    picked
        .into_iter()
        .map(|(_, s)| s)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Simplify: drop parenthetical asides, break at semicolons, keep the first
/// three sentences.
pub fn explain(text: &str) -> String {
    let simplified = PARENTHETICAL.replace_all(text, "").replace(';', ".");
    let sentences = split_sentences(&simplified);
    if sentences.is_empty() {
        return truncate_chars(text, 300);
    }
    sentences
        .into_iter()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyword-scored key points, spoken as "Point 1: ...".
pub fn key_points(text: &str, max_points: usize) -> String {
    let sentences = split_sentences(text);
    let kws = keywords(text, 10);
    let mut scored: Vec<(usize, &str)> = sentences
        .iter()
        .filter_map(|sentence| {
            let lowered = sentence.to_lowercase();
            let score = kws.iter().filter(|kw| lowered.contains(kw.as_str())).count();
            (score > 0).then_some((score, *sentence))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let mut points: Vec<&str> = scored.into_iter().take(max_points).map(|(_, s)| s).collect();
    if points.is_empty() {
        points = sentences.into_iter().take(max_points).collect();
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Point {}: {}", i + 1, p))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spoken description of a media placeholder, grounded in the surrounding text.
pub fn describe_media(kind: &str, context: &str) -> String {
    let base = match kind {
        "Image" => "There is an image on this page. It likely illustrates a concept discussed in this section.",
        "Table" => "There is a table here. It organizes data into rows and columns for comparison.",
        "Graph" => "There is a graph in this section. It visually represents numerical data or trends.",
        "Chart" => "There is a chart here showing statistical or comparative information.",
        "Figure" => "There is a figure on this page. It may be a diagram, illustration, or labeled image.",
        _ => "There is a visual element in this section.",
    };
    let topics = keywords(context, 5);
    if topics.is_empty() {
        base.to_string()
    } else {
        let listed = topics
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        format!("{base} The visual appears to relate to: {listed}.")
    }
}

/// Nearby-text answer used when no question-answering collaborator responds.
pub fn answer(_question: &str, context: &str) -> String {
    let gist = summarize(context, 2);
    if gist.is_empty() {
        "I could not find anything about that near the current section.".to_string()
    } else {
        format!("The nearby text says: {gist}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSAGE: &str = "Photosynthesis converts sunlight into chemical energy. \
        Plants absorb water through their roots. Chlorophyll gives leaves their green color. \
        Oxygen is released as a byproduct of photosynthesis. \
        Photosynthesis sustains almost every food chain on Earth.";

    #[test]
    fn short_text_summarizes_to_itself() {
        let text = "One sentence. Two sentences.";
        assert_eq!(summarize(text, 3), text);
    }

    #[test]
    fn summary_keeps_document_order() {
        let summary = summarize(PASSAGE, 3);
        let first = summary.find("Photosynthesis converts").expect("first sentence kept");
        let last = summary.find("food chain").expect("last sentence kept");
        assert!(first < last);
        assert!(split_sentences(&summary).len() <= 3);
    }

    #[test]
    fn explain_strips_parentheticals() {
        let text = "Water (a transparent, tasteless liquid) boils at sea level. It freezes too.";
        let out = explain(text);
        assert!(!out.contains("transparent"));
        assert!(out.contains("Water"));
    }

    #[test]
    fn key_points_are_numbered() {
        let out = key_points(PASSAGE, 3);
        assert!(out.starts_with("Point 1:"));
        assert!(out.contains("Point 2:"));
    }

    #[test]
    fn describe_media_mentions_context_topics() {
        let out = describe_media("Graph", PASSAGE);
        assert!(out.starts_with("There is a graph"));
        assert!(out.contains("relate to:"));
    }

    #[test]
    fn describe_media_without_context_is_still_speakable() {
        let out = describe_media("Sticker", "");
        assert_eq!(out, "There is a visual element in this section.");
    }

    #[test]
    fn keywords_exclude_stop_words() {
        let kws = keywords("the the the energy energy plants", 5);
        assert_eq!(kws.first().map(String::as_str), Some("energy"));
        assert!(!kws.iter().any(|k| k == "the"));
    }

    #[test]
    fn answer_leans_on_the_context() {
        let out = answer("what is photosynthesis", PASSAGE);
        assert!(out.starts_with("The nearby text says:"));
        assert!(out.contains("Photosynthesis"));
    }
}

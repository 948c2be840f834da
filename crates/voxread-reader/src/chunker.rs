//! Sentence-aligned chunking.
//!
//! Sentences accumulate into a buffer; when the next sentence would exceed the
//! word budget the buffer flushes as one chunk. A sentence is never split: an
//! oversized sentence becomes its own over-budget chunk. Media markers left by
//! text extraction (`[IMAGE: ...]`, `[TABLE: ...]`, ...) are isolated into
//! standalone flagged chunks so the playback loop can halt on them.

use crate::document::Chunk;
use once_cell::sync::Lazy;
use regex::Regex;

/// Word budget used when no configuration overrides it.
pub const DEFAULT_WORDS_PER_CHUNK: usize = 80;

static MEDIA_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\[(image|table|graph|figure|chart)[^\]]*\]").unwrap());

/// The marker kind in speakable form (`Image`, `Table`, ...), if `text` opens
/// with a media marker.
pub fn media_kind(text: &str) -> Option<String> {
    MEDIA_MARKER.captures(text.trim()).map(|caps| {
        let kind = caps[1].to_lowercase();
        let mut chars = kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => kind,
        }
    })
}

/// Split into sentences bounded by terminal punctuation followed by
/// whitespace, or by line breaks. Returned slices are trimmed and non-empty.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' => true,
            '.' | '!' | '?' => match chars.peek() {
                Some((_, next)) => next.is_whitespace(),
                None => true,
            },
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Chunk `text` under the given word budget.
pub fn chunk_text(text: &str, words_per_chunk: usize) -> Vec<Chunk> {
    fn flush(buffer: &mut Vec<&str>, buffered_words: &mut usize, pieces: &mut Vec<(String, bool)>) {
        if !buffer.is_empty() {
            pieces.push((buffer.join(" "), false));
            buffer.clear();
            *buffered_words = 0;
        }
    }

    let budget = words_per_chunk.max(1);
    let mut pieces: Vec<(String, bool)> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffered_words = 0;

    for sentence in split_sentences(text) {
        if MEDIA_MARKER.is_match(sentence) {
            flush(&mut buffer, &mut buffered_words, &mut pieces);
            pieces.push((sentence.to_string(), true));
            continue;
        }
        let words = sentence.split_whitespace().count();
        if buffered_words + words > budget && !buffer.is_empty() {
            flush(&mut buffer, &mut buffered_words, &mut pieces);
        }
        buffer.push(sentence);
        buffered_words += words;
    }
    flush(&mut buffer, &mut buffered_words, &mut pieces);

    pieces
        .into_iter()
        .enumerate()
        .map(|(ordinal, (text, has_media_marker))| Chunk {
            ordinal,
            text,
            has_media_marker,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_ws(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn chunks_concatenate_to_the_source() {
        let text = "The sun rises in the east. Birds sing at dawn.\n\
                    Rivers flow toward the sea! Do fish sleep? Nobody knows.\n\
                    A final line without terminal punctuation";
        let chunks = chunk_text(text, 8);
        let joined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(normalize_ws(&joined), normalize_ws(text));
    }

    #[test]
    fn no_chunk_splits_a_sentence() {
        let text = "One two three four five. Six seven eight. Nine ten eleven twelve.";
        let source = split_sentences(text);
        for chunk in chunk_text(text, 6) {
            for sentence in split_sentences(&chunk.text) {
                assert!(
                    source.contains(&sentence),
                    "{sentence:?} is not a whole source sentence"
                );
            }
        }
    }

    #[test]
    fn budget_flushes_between_sentences() {
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa.";
        let chunks = chunk_text(text, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Alpha beta gamma delta.");
        assert_eq!(chunks[1].text, "Epsilon zeta eta theta.");
        assert_eq!(chunks[2].text, "Iota kappa.");
    }

    #[test]
    fn oversized_sentence_becomes_its_own_chunk() {
        let long = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ") + ".";
        let text = format!("Short one. {long} Short two.");
        let chunks = chunk_text(&text, 10);
        assert!(chunks.iter().any(|c| c.text == long));
    }

    #[test]
    fn non_empty_input_yields_at_least_one_chunk() {
        assert!(!chunk_text("word", 80).is_empty());
        assert!(chunk_text("", 80).is_empty());
        assert!(chunk_text("   \n  ", 80).is_empty());
    }

    #[test]
    fn media_markers_are_isolated_and_flagged() {
        let text = "Before the figure. [IMAGE: 2 image(s) on this page] After the figure.";
        let chunks = chunk_text(text, 80);
        assert_eq!(chunks.len(), 3);
        assert!(!chunks[0].has_media_marker);
        assert!(chunks[1].has_media_marker);
        assert_eq!(chunks[1].text, "[IMAGE: 2 image(s) on this page]");
        assert!(!chunks[2].has_media_marker);
    }

    #[test]
    fn media_kind_is_speakable() {
        assert_eq!(media_kind("[IMAGE: one]").as_deref(), Some("Image"));
        assert_eq!(media_kind("[table of results]").as_deref(), Some("Table"));
        assert_eq!(media_kind("plain sentence"), None);
    }

    #[test]
    fn ordinals_are_sequential() {
        let chunks = chunk_text("A one. B two. C three.", 2);
        let ordinals: Vec<_> = chunks.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }
}

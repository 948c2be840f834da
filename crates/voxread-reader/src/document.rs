//! Document, chunk, and reading-cursor model.

use crate::chunker::chunk_text;

/// One speakable unit of a document: a run of whole sentences within the word
/// budget, or a standalone media marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub ordinal: usize,
    pub text: String,
    pub has_media_marker: bool,
}

/// A loaded document. Immutable for the rest of the session once built.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: String,
    pub chunks: Vec<Chunk>,
}

impl Document {
    pub fn load(name: impl Into<String>, text: impl Into<String>, words_per_chunk: usize) -> Self {
        let text = text.into();
        let chunks = chunk_text(&text, words_per_chunk);
        Self {
            name: name.into(),
            text,
            chunks,
        }
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Playback position. `chunk_index` advances only when a chunk finishes
/// naturally, or explicitly through `seek_next`/`seek_prev`; a pause always
/// keeps the interrupted chunk current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingCursor {
    pub chunk_index: usize,
    pub is_reading: bool,
    pub is_paused: bool,
}

impl ReadingCursor {
    pub fn reset(&mut self) {
        *self = ReadingCursor::default();
    }

    pub fn start(&mut self) {
        self.is_reading = true;
        self.is_paused = false;
    }

    /// Pausing outside a reading session is a no-op, so `is_paused` can only
    /// ever be observed after reading began.
    pub fn pause(&mut self) {
        if self.is_reading {
            self.is_paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    pub fn finish(&mut self) {
        self.is_reading = false;
        self.is_paused = false;
    }

    /// Advance past a naturally finished chunk. May land on `total` (one past
    /// the end), which the playback loop reads as completion.
    pub fn advance(&mut self, total: usize) {
        self.chunk_index = (self.chunk_index + 1).min(total);
    }

    /// Explicit navigation clamps to the last valid chunk.
    pub fn seek_next(&mut self, total: usize) {
        if total > 0 {
            self.chunk_index = (self.chunk_index + 1).min(total - 1);
        }
    }

    pub fn seek_prev(&mut self) {
        self.chunk_index = self.chunk_index.saturating_sub(1);
    }

    pub fn progress_pct(&self, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        ((self.chunk_index * 100) / total).min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_requires_reading() {
        let mut cursor = ReadingCursor::default();
        cursor.pause();
        assert!(!cursor.is_paused);
        cursor.start();
        cursor.pause();
        assert!(cursor.is_paused);
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut cursor = ReadingCursor::default();
        cursor.seek_prev();
        assert_eq!(cursor.chunk_index, 0);
        cursor.seek_next(3);
        cursor.seek_next(3);
        cursor.seek_next(3);
        assert_eq!(cursor.chunk_index, 2);
    }

    #[test]
    fn advance_may_pass_the_end() {
        let mut cursor = ReadingCursor::default();
        cursor.advance(1);
        assert_eq!(cursor.chunk_index, 1);
        cursor.advance(1);
        assert_eq!(cursor.chunk_index, 1);
    }

    #[test]
    fn progress_is_percentage_of_chunks_done() {
        let mut cursor = ReadingCursor::default();
        assert_eq!(cursor.progress_pct(0), 0);
        cursor.chunk_index = 1;
        assert_eq!(cursor.progress_pct(4), 25);
        cursor.chunk_index = 4;
        assert_eq!(cursor.progress_pct(4), 100);
    }

    #[test]
    fn document_load_builds_chunks() {
        let doc = Document::load("Notes", "One. Two. Three.", 80);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.chunk(0).unwrap().text, "One. Two. Three.");
    }
}

//! # voxread-reader — the reading side of a voice-first document reader
//!
//! Chunks extracted document text into sentence-aligned speakable units,
//! tracks the playback cursor, and provides the local derived-text heuristics
//! (summary, simplification, key points, media description) that back the
//! digest collaborator when it is unavailable.

pub mod chunker;
pub mod digest;
pub mod document;

pub use chunker::{chunk_text, media_kind, split_sentences, DEFAULT_WORDS_PER_CHUNK};
pub use document::{Chunk, Document, ReadingCursor};

//! Reader-screen handlers and the chunked playback loop.
//!
//! The loop speaks one chunk at a time with barge-in enabled. A barge-in
//! transcript is dispatched before the cursor can move for the interrupted
//! chunk, so a command spoken mid-chunk always acts on that chunk's position.

use crate::engine::{DialogueEngine, PROMPT_HELP_READER};
use crate::intent::{normalize, Intent};
use crate::session::{Screen, RATE_STEP, VOLUME_STEP};
use tracing::warn;
use voxread_reader::digest;
use voxread_reader::{media_kind, Document};
use voxread_voice::SpeakResult;

/// Unknown utterances at least this many words long go to the
/// question-answering collaborator; shorter ones get the help prompt.
const MIN_QUESTION_WORDS: usize = 3;

enum DigestKind {
    Summary,
    Explain,
    Clarify,
    KeyPoints,
}

impl DialogueEngine {
    pub(crate) fn reading_active(&self) -> bool {
        self.session.screen == Screen::Reader && self.cursor.is_reading && !self.cursor.is_paused
    }

    pub(crate) async fn on_reader(&mut self, raw: &str, intent: Intent) {
        match intent {
            Intent::StartRead => self.start_reading().await,
            Intent::Pause => self.pause_reading().await,
            Intent::Resume => self.resume_reading().await,
            Intent::Repeat => self.repeat_chunk().await,
            Intent::Next => self.seek(1).await,
            Intent::Prev => self.seek(-1).await,
            Intent::Slower => {
                self.session.adjust_rate(-RATE_STEP);
                self.say("Okay, reading slower.").await;
            }
            Intent::Faster => {
                self.session.adjust_rate(RATE_STEP);
                self.say("Okay, reading faster.").await;
            }
            Intent::Louder => {
                self.session.adjust_volume(VOLUME_STEP);
                self.say("Okay, speaking louder.").await;
            }
            Intent::Quieter => {
                self.session.adjust_volume(-VOLUME_STEP);
                self.say("Okay, speaking softer.").await;
            }
            Intent::Summarize => self.speak_digest(DigestKind::Summary).await,
            Intent::Explain => self.speak_digest(DigestKind::Explain).await,
            Intent::Clarify => self.speak_digest(DigestKind::Clarify).await,
            Intent::KeyPoints => self.speak_digest(DigestKind::KeyPoints).await,
            Intent::Describe => self.describe_current().await,
            Intent::Unknown if normalize(raw).split_whitespace().count() >= MIN_QUESTION_WORDS => {
                self.answer_question(raw).await;
            }
            _ => self.say(PROMPT_HELP_READER).await,
        }
    }

    /// While reading is active: speak the current chunk with barge-in, advance
    /// only on natural completion, and hand any interrupting transcript to the
    /// dispatcher first. Media-marker chunks halt automatic playback.
    pub(crate) async fn drive_reading(&mut self) {
        while self.reading_active() && self.pending.is_none() {
            let Some(doc) = self.document.as_ref() else {
                self.cursor.finish();
                return;
            };
            let total = doc.len();
            if self.cursor.chunk_index >= total {
                let name = doc.name.clone();
                self.cursor.finish();
                self.say(&format!(
                    "That is the end of {name}. Say repeat to hear it again, or logout when you are done."
                ))
                .await;
                return;
            }
            let Some(chunk) = doc.chunk(self.cursor.chunk_index).cloned() else {
                self.cursor.finish();
                return;
            };
            if chunk.has_media_marker {
                let kind = media_kind(&chunk.text).unwrap_or_else(|| "visual element".to_string());
                self.cursor.pause();
                self.say(&format!(
                    "This section has something visual, marked as {}. \
                     Say describe to hear about it, or next to continue.",
                    kind.to_lowercase()
                ))
                .await;
                return;
            }
            let utterance = self.utterance(&chunk.text);
            let locale = self.session.input_locale.clone();
            match self.arbiter.speak_with_barge_in(utterance, &locale).await {
                SpeakResult::Completed => self.cursor.advance(total),
                SpeakResult::Interrupted(t) => self.handle_utterance(&t.text).await,
            }
        }
    }

    async fn start_reading(&mut self) {
        let Some(doc) = self.document.as_ref() else {
            return self.say("No document is open. Say logout and sign in again.").await;
        };
        if doc.is_empty() {
            return self.say("This document appears to be empty.").await;
        }
        let name = doc.name.clone();
        self.cursor.start();
        self.say(&format!("Reading {name}.")).await;
    }

    async fn pause_reading(&mut self) {
        if !self.cursor.is_reading {
            return self.say("Nothing is being read right now.").await;
        }
        self.cursor.pause();
        let total = self.document.as_ref().map(Document::len).unwrap_or(0);
        let section = self.cursor.chunk_index + 1;
        let pct = self.cursor.progress_pct(total);
        self.say(&format!(
            "Paused at section {section} of {total}, {pct} percent done. Say resume to continue."
        ))
        .await;
    }

    async fn resume_reading(&mut self) {
        if self.cursor.is_reading && self.cursor.is_paused {
            self.cursor.resume();
            self.say("Resuming.").await;
        } else if self.cursor.is_reading {
            self.say("I am already reading.").await;
        } else {
            self.say("Nothing is paused. Say start reading to begin.").await;
        }
    }

    /// Re-speak the current chunk without moving the cursor. During active
    /// reading the loop re-speaks the unadvanced chunk by itself.
    async fn repeat_chunk(&mut self) {
        let Some(text) = self.current_chunk_text() else {
            return self.say("No document is open.").await;
        };
        if self.reading_active() {
            return;
        }
        self.say_interruptible(&text).await;
    }

    async fn seek(&mut self, delta: i32) {
        let Some(total) = self.document.as_ref().map(Document::len) else {
            return self.say("No document is open.").await;
        };
        if delta >= 0 {
            self.cursor.seek_next(total);
        } else {
            self.cursor.seek_prev();
        }
        // Navigation resumes a halted loop (media prompts pause it), so "next"
        // always moves on.
        if self.cursor.is_reading {
            self.cursor.resume();
        }
        let section = self.cursor.chunk_index + 1;
        self.say(&format!("Section {section}.")).await;
    }

    async fn speak_digest(&mut self, kind: DigestKind) {
        let Some(doc) = self.document.as_ref() else {
            return self.say("No document is open.").await;
        };
        let doc_text = doc.text.clone();
        let current = self.current_chunk_text().unwrap_or_default();
        let language = self
            .session
            .output_locale
            .split('-')
            .next()
            .unwrap_or("en")
            .to_string();
        let produced = match kind {
            DigestKind::Summary => self.digest.summarize(&doc_text, &language).await,
            DigestKind::Explain | DigestKind::Clarify => self.digest.explain(&current).await,
            DigestKind::KeyPoints => self.digest.key_points(&doc_text).await,
        };
        let body = match produced {
            Ok(text) if !text.trim().is_empty() => text,
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "digest collaborator unavailable; using local heuristics");
                }
                match kind {
                    DigestKind::Summary => digest::summarize(&doc_text, 3),
                    DigestKind::Explain | DigestKind::Clarify => digest::explain(&current),
                    DigestKind::KeyPoints => digest::key_points(&doc_text, 4),
                }
            }
        };
        let spoken = match kind {
            DigestKind::Summary => format!("Here is a summary. {body}"),
            DigestKind::Explain => format!("Let me explain. {body}"),
            DigestKind::Clarify => format!("Let me put that more simply. {body}"),
            DigestKind::KeyPoints => body,
        };
        // Reading stays suspended only for the length of this speech; the loop
        // picks the same chunk back up afterwards.
        self.say_interruptible(&spoken).await;
    }

    async fn describe_current(&mut self) {
        let Some(doc) = self.document.as_ref() else {
            return self.say("No document is open.").await;
        };
        let marker = doc
            .chunk(self.cursor.chunk_index)
            .and_then(|chunk| media_kind(&chunk.text));
        let Some(kind) = marker else {
            return self
                .say("I do not see an image or table at this point in the document.")
                .await;
        };
        let context = self.context_window(2);
        let spoken = match self.digest.describe_media(&kind, &context).await {
            Ok(text) if !text.trim().is_empty() => text,
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "description collaborator unavailable; using template");
                }
                digest::describe_media(&kind, &context)
            }
        };
        self.say_interruptible(&spoken).await;
    }

    async fn answer_question(&mut self, raw: &str) {
        let context = self.context_window(2);
        let spoken = match self.digest.answer(raw, &context).await {
            Ok(text) if !text.trim().is_empty() => text,
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "answer collaborator unavailable; using nearby text");
                }
                digest::answer(raw, &context)
            }
        };
        self.say_interruptible(&spoken).await;
    }

    fn current_chunk_text(&self) -> Option<String> {
        self.document
            .as_ref()
            .and_then(|doc| doc.chunk(self.cursor.chunk_index))
            .map(|chunk| chunk.text.clone())
    }

    /// Two chunks either side of the cursor, joined, for context-aware
    /// collaborator calls.
    fn context_window(&self, radius: usize) -> String {
        let Some(doc) = self.document.as_ref() else {
            return String::new();
        };
        let index = self.cursor.chunk_index.min(doc.len().saturating_sub(1));
        let start = index.saturating_sub(radius);
        let end = (index + radius + 1).min(doc.len());
        doc.chunks[start..end]
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

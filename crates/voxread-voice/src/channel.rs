//! **Speech channels** — the capability boundary between the dialogue engine
//! and whatever actually produces and consumes audio.
//!
//! Implement `SpeechOutput` for a synthesis capability (platform TTS, a remote
//! speech API, a console printer) and `SpeechInput` for a recognition
//! capability. Both are driven exclusively by the [`TurnArbiter`], which owns
//! the exclusive/overlapping-use contract between them.
//!
//! [`TurnArbiter`]: crate::arbiter::TurnArbiter

use crate::error::SpeechError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// One utterance handed to the synthesis capability. Delivery parameters are
/// snapshotted at construction, so a rate or volume change never affects an
/// utterance already in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Output locale tag, e.g. `en-US` or `hi-IN`.
    pub locale: String,
    /// Speaking rate multiplier (1.0 = natural).
    pub rate: f32,
    /// Playback volume in 0.0..=1.0.
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
            rate: 1.0,
            volume: 1.0,
        }
    }

    pub fn with_delivery(mut self, rate: f32, volume: f32) -> Self {
        self.rate = rate;
        self.volume = volume;
        self
    }
}

/// How a synthesis attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The utterance played to its natural end.
    Finished,
    /// Cancellation fired before the end; the remainder was discarded.
    Cancelled,
    /// The capability failed to render the utterance.
    Failed(String),
}

/// Ranked hypotheses from one recognition attempt.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub alternatives: Vec<String>,
}

impl Recognition {
    pub fn new(alternatives: Vec<String>) -> Self {
        Self { alternatives }
    }

    /// The alternative the arbiter acts on: first in rank order with any
    /// non-whitespace content.
    pub fn first_non_empty(&self) -> Option<&str> {
        self.alternatives
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// A recognized user utterance, as delivered to the dialogue layer.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    /// Input locale the channel was bound to when this was heard.
    pub locale: String,
    pub heard_at: DateTime<Utc>,
    /// True when this arrived on the interrupt channel and cancelled speech.
    pub via_barge_in: bool,
}

/// Which channels the arbiter currently holds open.
///
/// `Speaking` and `ListeningPrimary` are mutually exclusive at every instant.
/// `ListeningInterrupt` means an interrupt recognition channel is open
/// alongside in-flight speech; it never exists on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Speaking,
    ListeningPrimary,
    ListeningInterrupt,
}

/// Synthesis capability.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Render the utterance to the user. Implementations must watch `cancel`
    /// and return `SpeakOutcome::Cancelled` promptly once it fires; the
    /// remainder of the utterance is discarded, never replayed.
    async fn speak(&self, utterance: Utterance, cancel: CancellationToken) -> SpeakOutcome;
}

/// Recognition capability.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Run one recognition attempt bound to `locale`. The binding is fixed for
    /// the lifetime of the attempt; a language change takes effect on the next
    /// call. Cancellation surfaces as `SpeechError::Aborted`, and the attempt
    /// must not consume user speech it did not deliver.
    async fn recognize(
        &self,
        locale: &str,
        cancel: CancellationToken,
    ) -> Result<Recognition, SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_skips_blank_alternatives() {
        let rec = Recognition::new(vec!["".into(), "   ".into(), " pause ".into()]);
        assert_eq!(rec.first_non_empty(), Some("pause"));
    }

    #[test]
    fn first_non_empty_on_empty_recognition() {
        assert_eq!(Recognition::default().first_non_empty(), None);
    }

    #[test]
    fn delivery_snapshot() {
        let u = Utterance::new("hello", "en-US").with_delivery(1.5, 0.6);
        assert_eq!(u.rate, 1.5);
        assert_eq!(u.volume, 0.6);
    }
}

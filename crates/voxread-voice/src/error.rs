//! Error types for the speech channel layer.

use thiserror::Error;

/// Result type alias for speech channel operations.
pub type VoiceResult<T> = Result<T, SpeechError>;

/// Errors reported by speech capabilities and the turn arbiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The recognition capability heard nothing before giving up on the attempt.
    #[error("no speech detected")]
    NoSpeech,

    /// The recognition attempt was aborted before producing a result.
    #[error("recognition aborted")]
    Aborted,

    /// Engine or network failure inside the recognition capability.
    #[error("recognition error: {0}")]
    Recognition(String),

    /// The synthesis capability failed to render an utterance.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// The capability behind the channel is gone; no further attempt can succeed.
    /// Raised only when the embedding process is shutting the engine down.
    #[error("speech channel closed")]
    ChannelClosed,

    #[error("configuration error: {0}")]
    Config(String),
}

impl SpeechError {
    /// Transient misses retry on the short backoff tier; hard failures on the
    /// long tier. `ChannelClosed` is never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, SpeechError::NoSpeech | SpeechError::Aborted)
    }
}

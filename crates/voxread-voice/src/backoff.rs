//! Retry pacing for the unbounded recognition loop.
//!
//! Recognition never gives up: a reader who cannot be heard once must still be
//! heard eventually. Failed attempts are paced by two named tiers instead of a
//! retry ceiling.

use crate::error::SpeechError;
use std::time::Duration;

/// Named backoff tiers between recognition attempts.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay after a benign miss: no speech detected, or an aborted channel.
    pub retry_short: Duration,
    /// Delay after an engine or network failure.
    pub retry_long: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            retry_short: Duration::from_millis(250),
            retry_long: Duration::from_millis(800),
        }
    }
}

impl BackoffPolicy {
    pub fn new(retry_short: Duration, retry_long: Duration) -> Self {
        Self {
            retry_short,
            retry_long,
        }
    }

    /// Tier for the next attempt after `error`.
    pub fn delay_for(&self, error: &SpeechError) -> Duration {
        if error.is_transient() {
            self.retry_short
        } else {
            self.retry_long
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_use_short_tier() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(&SpeechError::NoSpeech), policy.retry_short);
        assert_eq!(policy.delay_for(&SpeechError::Aborted), policy.retry_short);
    }

    #[test]
    fn hard_errors_use_long_tier() {
        let policy = BackoffPolicy::default();
        let err = SpeechError::Recognition("engine offline".into());
        assert_eq!(policy.delay_for(&err), policy.retry_long);
    }
}

//! Deterministic simulated speech backends.
//!
//! Stand-ins for the real synthesis/recognition capabilities, used by the
//! integration tests and the console demo. `ScriptedInput` replays a queue of
//! hearings after virtual delays; `ScriptedOutput` paces playback by word
//! count and honors cancellation. Both record into a shared [`ChannelTrace`]
//! so tests can assert channel-occupancy invariants over the observed event
//! order.

use crate::channel::{Recognition, SpeakOutcome, SpeechInput, SpeechOutput, Utterance};
use crate::error::SpeechError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One observable event on a speech channel, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    SpeakStart(String),
    SpeakEnd { text: String, cancelled: bool },
    ListenStart,
    ListenEnd,
}

/// Shared, ordered trace of channel activity across both backends.
#[derive(Debug, Clone, Default)]
pub struct ChannelTrace(Arc<Mutex<Vec<ChannelEvent>>>);

impl ChannelTrace {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ChannelEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Every utterance that began playback, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChannelEvent::SpeakStart(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// True if the trace ever shows two speak windows or two listen windows
    /// open at once, or a primary listen window overlapping speech. A listen
    /// window that starts while speech is in flight is the interrupt channel
    /// and is allowed to overlap; one that starts in silence is primary and
    /// must end before any speech starts.
    pub fn exclusion_violated(&self) -> bool {
        let mut speak_open = false;
        let mut primary_open = false;
        let mut interrupt_open = false;
        for event in self.events() {
            match event {
                ChannelEvent::SpeakStart(_) => {
                    if speak_open || primary_open {
                        return true;
                    }
                    speak_open = true;
                }
                ChannelEvent::SpeakEnd { .. } => speak_open = false,
                ChannelEvent::ListenStart => {
                    if speak_open {
                        if interrupt_open {
                            return true;
                        }
                        interrupt_open = true;
                    } else {
                        if primary_open || interrupt_open {
                            return true;
                        }
                        primary_open = true;
                    }
                }
                ChannelEvent::ListenEnd => {
                    if interrupt_open {
                        interrupt_open = false;
                    } else {
                        primary_open = false;
                    }
                }
            }
        }
        false
    }
}

/// One scripted recognition attempt: delivered after a virtual delay.
#[derive(Debug, Clone)]
struct Hearing {
    after: Duration,
    result: Result<Vec<String>, SpeechError>,
}

/// Replays scripted hearings. A hearing is only consumed when its delay
/// elapses inside an attempt; a cancelled attempt leaves it queued, the same
/// way aborting a microphone session does not consume words the user has not
/// yet said. An exhausted script reports `ChannelClosed`.
pub struct ScriptedInput {
    script: Mutex<VecDeque<Hearing>>,
    trace: ChannelTrace,
}

impl ScriptedInput {
    pub fn new(trace: ChannelTrace) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            trace,
        }
    }

    /// Queue a successful hearing delivered `after_ms` into the attempt.
    pub fn hear(self, after_ms: u64, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Hearing {
            after: Duration::from_millis(after_ms),
            result: Ok(vec![text.to_string()]),
        });
        self
    }

    /// Queue a failed attempt.
    pub fn miss(self, after_ms: u64, error: SpeechError) -> Self {
        self.script.lock().unwrap().push_back(Hearing {
            after: Duration::from_millis(after_ms),
            result: Err(error),
        });
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    async fn recognize(
        &self,
        _locale: &str,
        cancel: CancellationToken,
    ) -> Result<Recognition, SpeechError> {
        self.trace.push(ChannelEvent::ListenStart);
        let next_delay = self.script.lock().unwrap().front().map(|h| h.after);
        let result = match next_delay {
            None => Err(SpeechError::ChannelClosed),
            Some(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        let hearing = self
                            .script
                            .lock()
                            .unwrap()
                            .pop_front()
                            .expect("hearing still queued");
                        hearing.result.map(Recognition::new)
                    }
                    _ = cancel.cancelled() => Err(SpeechError::Aborted),
                }
            }
        };
        self.trace.push(ChannelEvent::ListenEnd);
        result
    }
}

/// Paces playback at a fixed virtual duration per word, scaled down by the
/// utterance rate, and honors cancellation mid-utterance.
pub struct ScriptedOutput {
    per_word: Duration,
    fail_containing: Option<String>,
    trace: ChannelTrace,
}

impl ScriptedOutput {
    pub fn new(trace: ChannelTrace) -> Self {
        Self {
            per_word: Duration::from_millis(20),
            fail_containing: None,
            trace,
        }
    }

    pub fn with_per_word(mut self, per_word: Duration) -> Self {
        self.per_word = per_word;
        self
    }

    /// Report synthesis failure for any utterance containing `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_containing = Some(needle.to_string());
        self
    }
}

#[async_trait]
impl SpeechOutput for ScriptedOutput {
    async fn speak(&self, utterance: Utterance, cancel: CancellationToken) -> SpeakOutcome {
        self.trace.push(ChannelEvent::SpeakStart(utterance.text.clone()));
        if let Some(needle) = &self.fail_containing {
            if utterance.text.contains(needle.as_str()) {
                self.trace.push(ChannelEvent::SpeakEnd {
                    text: utterance.text,
                    cancelled: false,
                });
                return SpeakOutcome::Failed(format!("scripted failure on {needle:?}"));
            }
        }
        let words = utterance.text.split_whitespace().count().max(1) as u32;
        let duration = self.per_word.mul_f32(words as f32 / utterance.rate.max(0.1));
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = cancel.cancelled() => true,
        };
        self.trace.push(ChannelEvent::SpeakEnd {
            text: utterance.text,
            cancelled,
        });
        if cancelled {
            SpeakOutcome::Cancelled
        } else {
            SpeakOutcome::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_script_is_empty() {
        let input = ScriptedInput::new(ChannelTrace::new());
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn hearings_queue_in_order() {
        let input = ScriptedInput::new(ChannelTrace::new())
            .hear(0, "hi")
            .miss(10, SpeechError::NoSpeech)
            .hear(0, "pause");
        assert_eq!(input.remaining(), 3);
    }

    #[test]
    fn trace_detects_overlapping_speaks() {
        let trace = ChannelTrace::new();
        trace.push(ChannelEvent::SpeakStart("a".into()));
        trace.push(ChannelEvent::SpeakStart("b".into()));
        assert!(trace.exclusion_violated());
    }

    #[test]
    fn trace_allows_interrupt_listen_during_speech() {
        let trace = ChannelTrace::new();
        trace.push(ChannelEvent::SpeakStart("a".into()));
        trace.push(ChannelEvent::ListenStart);
        trace.push(ChannelEvent::ListenEnd);
        trace.push(ChannelEvent::SpeakEnd {
            text: "a".into(),
            cancelled: false,
        });
        assert!(!trace.exclusion_violated());
    }

    #[test]
    fn trace_rejects_primary_listen_overlapping_speech() {
        let trace = ChannelTrace::new();
        trace.push(ChannelEvent::ListenStart);
        trace.push(ChannelEvent::SpeakStart("a".into()));
        assert!(trace.exclusion_violated());
    }
}

//! **Turn arbiter** — exclusive/overlapping-use contract between one speech
//! output channel and up to two speech input channels.
//!
//! Higher layers never hold a channel handle themselves. The arbiter owns a
//! single-slot interrupt channel and spawns at most one output task at a time,
//! so "at most one primary listen, at most one interrupt listen" is enforced
//! structurally rather than by convention. Cancellation is cooperative
//! throughout: a cancel request fires a token, and the requester awaits the
//! channel task's closure before the slot is reused.

use crate::backoff::BackoffPolicy;
use crate::channel::{
    Recognition, SpeakOutcome, SpeechInput, SpeechOutput, Transcript, TurnState, Utterance,
};
use crate::error::{SpeechError, VoiceResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How a speak call resolved.
#[derive(Debug, Clone)]
pub enum SpeakResult {
    /// The utterance ran to its natural end (synthesis failures count here:
    /// the utterance is abandoned, not retried).
    Completed,
    /// A transcript arrived on the interrupt channel; the in-flight speech was
    /// cancelled and the remainder discarded.
    Interrupted(Transcript),
}

/// Single-slot handle to an open interrupt recognition channel.
struct InterruptChannel {
    cancel: CancellationToken,
    task: JoinHandle<Result<Recognition, SpeechError>>,
}

/// Mediates the speech output and speech input capabilities.
pub struct TurnArbiter {
    output: Arc<dyn SpeechOutput>,
    input: Arc<dyn SpeechInput>,
    backoff: BackoffPolicy,
    state: TurnState,
    interrupt: Option<InterruptChannel>,
    listen_attempts: u64,
}

enum Raced {
    SpeechDone(SpeakOutcome),
    InterruptClosed(Result<Result<Recognition, SpeechError>, JoinError>),
    ReopenDue,
}

impl TurnArbiter {
    pub fn new(output: Arc<dyn SpeechOutput>, input: Arc<dyn SpeechInput>) -> Self {
        Self {
            output,
            input,
            backoff: BackoffPolicy::default(),
            state: TurnState::Idle,
            interrupt: None,
            listen_attempts: 0,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Current channel occupancy.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Total recognition attempts made by [`listen`](Self::listen). Retries
    /// are unbounded; this counter is the observable trace of them.
    pub fn listen_attempts(&self) -> u64 {
        self.listen_attempts
    }

    /// Speak an utterance with no interrupt channel. Resolves when the output
    /// ends naturally or fails (failure abandons the utterance).
    pub async fn speak(&mut self, utterance: Utterance) {
        self.close_interrupt().await;
        self.set_state(TurnState::Speaking);
        let outcome = self
            .output
            .speak(utterance, CancellationToken::new())
            .await;
        if let SpeakOutcome::Failed(reason) = &outcome {
            warn!(%reason, "synthesis failed; treating utterance as finished");
        }
        self.set_state(TurnState::Idle);
    }

    /// Speak an utterance while keeping one interrupt recognition channel open
    /// beside it. A transcript on that channel cancels the speech immediately
    /// and is returned to the caller for dispatch; the interrupted utterance's
    /// remainder is never replayed. An interrupt channel that closes without
    /// content is reopened after a backoff while the speech continues, so the
    /// user is never unheard mid-utterance.
    pub async fn speak_with_barge_in(
        &mut self,
        utterance: Utterance,
        input_locale: &str,
    ) -> SpeakResult {
        self.close_interrupt().await;
        self.set_state(TurnState::Speaking);

        let cancel = CancellationToken::new();
        let mut speak_task = {
            let output = Arc::clone(&self.output);
            let cancel = cancel.clone();
            tokio::spawn(async move { output.speak(utterance, cancel).await })
        };
        // Let the output task begin before the interrupt window opens, so a
        // barge-in can never land ahead of the speech it targets.
        tokio::task::yield_now().await;

        self.open_interrupt(input_locale);
        let mut reopen: Option<Duration> = None;

        loop {
            let raced = if let Some(channel) = self.interrupt.as_mut() {
                tokio::select! {
                    joined = &mut speak_task => Raced::SpeechDone(join_outcome(joined)),
                    heard = &mut channel.task => Raced::InterruptClosed(heard),
                }
            } else if let Some(delay) = reopen.take() {
                tokio::select! {
                    joined = &mut speak_task => Raced::SpeechDone(join_outcome(joined)),
                    _ = tokio::time::sleep(delay) => Raced::ReopenDue,
                }
            } else {
                Raced::SpeechDone(join_outcome((&mut speak_task).await))
            };

            match raced {
                Raced::SpeechDone(outcome) => {
                    if let SpeakOutcome::Failed(reason) = &outcome {
                        warn!(%reason, "synthesis failed; treating utterance as finished");
                    }
                    self.close_interrupt().await;
                    self.set_state(TurnState::Idle);
                    return SpeakResult::Completed;
                }
                Raced::InterruptClosed(heard) => {
                    // The channel task has already run to completion; the slot
                    // is free again without a cancel round-trip.
                    self.interrupt = None;
                    match heard {
                        Ok(Ok(recognition)) => {
                            if let Some(text) = recognition.first_non_empty() {
                                let transcript = Transcript {
                                    text: text.to_string(),
                                    locale: input_locale.to_string(),
                                    heard_at: Utc::now(),
                                    via_barge_in: true,
                                };
                                cancel.cancel();
                                let _ = speak_task.await;
                                self.set_state(TurnState::Idle);
                                debug!(text = %transcript.text, "barge-in cancelled speech");
                                return SpeakResult::Interrupted(transcript);
                            }
                            self.set_state(TurnState::Speaking);
                            reopen = Some(self.backoff.retry_short);
                        }
                        Ok(Err(SpeechError::ChannelClosed)) => {
                            // Input capability is gone; finish the utterance.
                            self.set_state(TurnState::Speaking);
                        }
                        Ok(Err(e)) => {
                            trace!(error = %e, "interrupt channel closed without content");
                            self.set_state(TurnState::Speaking);
                            reopen = Some(self.backoff.delay_for(&e));
                        }
                        Err(join_err) => {
                            warn!(error = %join_err, "interrupt channel task failed");
                            self.set_state(TurnState::Speaking);
                            reopen = Some(self.backoff.retry_short);
                        }
                    }
                }
                Raced::ReopenDue => {
                    self.open_interrupt(input_locale);
                }
            }
        }
    }

    /// Primary listening. Precondition: no speech is outputting (the dialogue
    /// loop is sequential, so this holds by construction). Retries are
    /// unbounded: benign misses and hard failures alike are paced by the
    /// backoff policy and tried again. The one terminal condition is
    /// `ChannelClosed` — the capability itself has been disposed.
    pub async fn listen(&mut self, locale: &str) -> VoiceResult<Transcript> {
        self.close_interrupt().await;
        self.set_state(TurnState::ListeningPrimary);
        loop {
            self.listen_attempts += 1;
            match self
                .input
                .recognize(locale, CancellationToken::new())
                .await
            {
                Ok(recognition) => {
                    if let Some(text) = recognition.first_non_empty() {
                        let transcript = Transcript {
                            text: text.to_string(),
                            locale: locale.to_string(),
                            heard_at: Utc::now(),
                            via_barge_in: false,
                        };
                        self.set_state(TurnState::Idle);
                        return Ok(transcript);
                    }
                    tokio::time::sleep(self.backoff.retry_short).await;
                }
                Err(SpeechError::ChannelClosed) => {
                    self.set_state(TurnState::Idle);
                    return Err(SpeechError::ChannelClosed);
                }
                Err(e) => {
                    trace!(error = %e, attempts = self.listen_attempts, "recognition retry");
                    tokio::time::sleep(self.backoff.delay_for(&e)).await;
                }
            }
        }
    }

    /// Cancel every open channel and return to idle (logout path).
    pub async fn cancel_all(&mut self) {
        self.close_interrupt().await;
        self.set_state(TurnState::Idle);
    }

    fn open_interrupt(&mut self, locale: &str) {
        debug_assert!(self.interrupt.is_none(), "interrupt channel slot occupied");
        let cancel = CancellationToken::new();
        let task = {
            let input = Arc::clone(&self.input);
            let cancel = cancel.clone();
            let locale = locale.to_string();
            tokio::spawn(async move { input.recognize(&locale, cancel).await })
        };
        self.interrupt = Some(InterruptChannel { cancel, task });
        self.set_state(TurnState::ListeningInterrupt);
    }

    /// Cooperatively close the interrupt slot: fire the token, then await the
    /// channel task before the slot may be reused.
    async fn close_interrupt(&mut self) {
        if let Some(channel) = self.interrupt.take() {
            channel.cancel.cancel();
            let _ = channel.task.await;
        }
    }

    fn set_state(&mut self, next: TurnState) {
        if self.state != next {
            trace!(from = ?self.state, to = ?next, "turn state");
            self.state = next;
        }
    }
}

fn join_outcome(joined: Result<SpeakOutcome, JoinError>) -> SpeakOutcome {
    joined.unwrap_or_else(|e| SpeakOutcome::Failed(format!("speak task: {e}")))
}

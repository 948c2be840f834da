//! # voxread-voice — turn arbitration for a voice-first reader
//!
//! Mediates one speech output channel and up to two speech input channels so
//! the dialogue layer never reasons about overlapping channel lifecycles.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Turn Arbiter                        │
//! │  speak ───────────► SpeechOutput task ──┐                 │
//! │                        ▲                │ natural end     │
//! │                 cancel │                ▼                 │
//! │  barge-in ◄── interrupt SpeechInput ── select! ── result  │
//! │                                                           │
//! │  listen ──────────► SpeechInput (primary, retry forever)  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariants: speaking and primary listening are mutually exclusive; the
//! interrupt channel exists only beside in-flight speech; both input channels
//! are single-slot. A barge-in transcript cancels the speech cooperatively and
//! is handed back for dispatch before anything else happens.

pub mod arbiter;
pub mod backoff;
pub mod channel;
pub mod error;
pub mod remote;
pub mod scripted;

pub use arbiter::{SpeakResult, TurnArbiter};
pub use backoff::BackoffPolicy;
pub use channel::{
    Recognition, SpeakOutcome, SpeechInput, SpeechOutput, Transcript, TurnState, Utterance,
};
pub use error::{SpeechError, VoiceResult};
pub use remote::RemoteTts;
pub use scripted::{ChannelEvent, ChannelTrace, ScriptedInput, ScriptedOutput};

//! # voxread-dialogue — conversation engine for a voice-first document reader
//!
//! Consumes recognized utterances, classifies them against a fixed lexicon,
//! and drives the screens of the conversation: Welcome, voice login, biometric
//! face gate, document dashboard, and the chunked reader with barge-in.
//! External collaborators (credentials, biometrics, files, summaries) sit
//! behind traits with deterministic fallbacks, so the conversation proceeds
//! whatever fails around it.

pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod language;
pub mod local_files;
pub mod remote;
pub mod session;

mod reading;

pub use collab::{
    demo_files, demo_text, BiometricGate, CollabError, CredentialStore, DemoLibrary,
    DigestService, FaceGateOutcome, FileEntry, FileSource, InMemoryCredentials, LocalDigest,
    SimulatedBiometric,
};
pub use config::EngineConfig;
pub use engine::DialogueEngine;
pub use error::{DialogueError, DialogueResult};
pub use intent::{classify, extract_password, extract_slot_number, extract_username, Intent};
pub use language::{lookup as lookup_language, Language, LANGUAGES};
pub use local_files::LocalLibrary;
pub use remote::{RemoteDigest, RemoteLibrary};
pub use session::{LoginStep, Screen, Session};

//! External collaborator boundary: credentials, biometric gate, file source,
//! and derived-text digest.
//!
//! Every trait here has a deterministic in-process implementation. The engine
//! treats collaborator failure as a signal to fall back, never as something to
//! say to the user: the conversation always proceeds.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use thiserror::Error;
use voxread_reader::digest;

#[derive(Error, Debug, Clone)]
pub enum CollabError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Case-insensitive, punctuation-free form used for credential comparison.
pub fn normalize_credential(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The stored secret for `username`, or `None` when the user is unknown.
    async fn lookup(&self, username: &str) -> Result<Option<String>, CollabError>;
}

/// Demo credential table. Doubles as the fallback when a real store fails.
pub struct InMemoryCredentials {
    users: HashMap<String, String>,
}

impl Default for InMemoryCredentials {
    fn default() -> Self {
        let users = [
            ("harini", "1234"),
            ("demo", "demo"),
            ("user", "password"),
            ("admin", "admin"),
        ]
        .into_iter()
        .map(|(u, p)| (u.to_string(), p.to_string()))
        .collect();
        Self { users }
    }
}

impl InMemoryCredentials {
    pub fn with_user(mut self, username: &str, secret: &str) -> Self {
        self.users
            .insert(normalize_credential(username), secret.to_string());
        self
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentials {
    async fn lookup(&self, username: &str) -> Result<Option<String>, CollabError> {
        Ok(self.users.get(&normalize_credential(username)).cloned())
    }
}

// ---------------------------------------------------------------------------
// Biometric gate
// ---------------------------------------------------------------------------

/// Outcome of one capture-and-match round at the face gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceGateOutcome {
    Matched { freshly_enrolled: bool },
    Mismatched,
    NoFaceDetected,
    CameraUnavailable,
}

#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// Capture a frame and match it against the enrolled descriptor for
    /// `username`, enrolling automatically when none exists yet.
    async fn check(&self, username: &str) -> FaceGateOutcome;
}

/// Deterministic simulated gate: each username maps to a seeded descriptor, so
/// the first check enrolls and every later check matches. Outcomes can be
/// scripted up front for exercising the failure prompts.
#[derive(Default)]
pub struct SimulatedBiometric {
    descriptors: Mutex<HashMap<String, u64>>,
    scripted: Mutex<VecDeque<FaceGateOutcome>>,
}

impl SimulatedBiometric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes returned before the deterministic behavior resumes.
    pub fn with_outcomes(self, outcomes: Vec<FaceGateOutcome>) -> Self {
        *self.scripted.lock().unwrap() = outcomes.into();
        self
    }

    fn descriptor(username: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        username.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl BiometricGate for SimulatedBiometric {
    async fn check(&self, username: &str) -> FaceGateOutcome {
        if let Some(outcome) = self.scripted.lock().unwrap().pop_front() {
            return outcome;
        }
        let captured = Self::descriptor(username);
        let mut descriptors = self.descriptors.lock().unwrap();
        match descriptors.get(username) {
            Some(enrolled) if *enrolled == captured => FaceGateOutcome::Matched {
                freshly_enrolled: false,
            },
            Some(_) => FaceGateOutcome::Mismatched,
            None => {
                descriptors.insert(username.to_string(), captured);
                FaceGateOutcome::Matched {
                    freshly_enrolled: true,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// One discoverable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    /// Spoken type label, e.g. "PDF" or "Text".
    pub kind: String,
    pub icon: String,
}

#[async_trait]
pub trait FileSource: Send + Sync {
    async fn scan(&self) -> Result<Vec<FileEntry>, CollabError>;
    async fn load_text(&self, name: &str) -> Result<String, CollabError>;
}

/// The fixed list announced when no real file source responds.
pub fn demo_files() -> Vec<FileEntry> {
    [
        ("Maths Notes", "PDF", "📄"),
        ("History Book", "ePub", "📚"),
        ("Science Chapter", "PDF", "📄"),
        ("English Grammar", "Word Document", "📝"),
    ]
    .into_iter()
    .map(|(name, kind, icon)| FileEntry {
        name: name.to_string(),
        kind: kind.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

/// Fixed demo text substituted when document text cannot be fetched.
pub fn demo_text(name: &str) -> String {
    match name {
        "Maths Notes" => "\
Fractions describe parts of a whole. The number above the line is the numerator. \
The number below the line is the denominator. Two fractions are equivalent when \
they describe the same amount. To add fractions, first bring them to a common \
denominator. Multiplying fractions is simpler: multiply the numerators and the \
denominators directly. Division by a fraction is multiplication by its reciprocal. \
Practice these rules until they feel natural."
            .to_string(),
        "History Book" => "\
The printing press changed how knowledge traveled. Before it, every book was \
copied by hand, and a single copy could take months. Printed pages made books \
cheaper and far more common. Ideas began to move faster than any messenger. \
Newspapers followed, and with them a public that expected to be informed. \
Historians regard the press as one of the great accelerators of social change."
            .to_string(),
        "Science Chapter" => "\
Photosynthesis converts sunlight into chemical energy. Plants absorb water \
through their roots and carbon dioxide through tiny openings in their leaves. \
Chlorophyll captures light and drives the reaction forward. Oxygen is released \
as a byproduct, which is the oxygen we breathe.\n\
[IMAGE: diagram of a leaf cross-section]\n\
The glucose produced feeds the plant and, through food chains, nearly every \
living thing. Without photosynthesis most life on Earth would not exist."
            .to_string(),
        "English Grammar" => "\
A sentence needs a subject and a verb. The subject names who or what the \
sentence is about. The verb tells what the subject does or is. Adjectives \
describe nouns, while adverbs describe verbs, adjectives, or other adverbs. \
Punctuation marks the boundaries of thought. A full stop ends a statement, and \
a question mark ends a question."
            .to_string(),
        _ => "This document could not be loaded, so here is a short practice text. \
The quick brown fox jumps over the lazy dog. Reading aloud improves focus. \
Say next, repeat, or summarize at any time."
            .to_string(),
    }
}

/// Always-available file source backed by the demo list.
#[derive(Debug, Default)]
pub struct DemoLibrary;

#[async_trait]
impl FileSource for DemoLibrary {
    async fn scan(&self) -> Result<Vec<FileEntry>, CollabError> {
        Ok(demo_files())
    }

    async fn load_text(&self, name: &str) -> Result<String, CollabError> {
        Ok(demo_text(name))
    }
}

// ---------------------------------------------------------------------------
// Derived-text digest
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DigestService: Send + Sync {
    async fn summarize(&self, text: &str, language: &str) -> Result<String, CollabError>;
    async fn explain(&self, text: &str) -> Result<String, CollabError>;
    async fn key_points(&self, text: &str) -> Result<String, CollabError>;
    async fn describe_media(&self, kind: &str, context: &str) -> Result<String, CollabError>;
    async fn answer(&self, question: &str, context: &str) -> Result<String, CollabError>;
}

/// Heuristic digest, always available. Language is accepted for interface
/// parity but the heuristics operate on the text as-is.
#[derive(Debug, Default)]
pub struct LocalDigest;

#[async_trait]
impl DigestService for LocalDigest {
    async fn summarize(&self, text: &str, _language: &str) -> Result<String, CollabError> {
        Ok(digest::summarize(text, 3))
    }

    async fn explain(&self, text: &str) -> Result<String, CollabError> {
        Ok(digest::explain(text))
    }

    async fn key_points(&self, text: &str) -> Result<String, CollabError> {
        Ok(digest::key_points(text, 4))
    }

    async fn describe_media(&self, kind: &str, context: &str) -> Result<String, CollabError> {
        Ok(digest::describe_media(kind, context))
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String, CollabError> {
        Ok(digest::answer(question, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_credentials_match_after_normalization() {
        let store = InMemoryCredentials::default();
        let secret = store.lookup("Harini!").await.unwrap();
        assert_eq!(secret.as_deref(), Some("1234"));
        assert_eq!(store.lookup("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn simulated_biometric_enrolls_then_matches() {
        let gate = SimulatedBiometric::new();
        assert_eq!(
            gate.check("harini").await,
            FaceGateOutcome::Matched {
                freshly_enrolled: true
            }
        );
        assert_eq!(
            gate.check("harini").await,
            FaceGateOutcome::Matched {
                freshly_enrolled: false
            }
        );
    }

    #[tokio::test]
    async fn scripted_outcomes_come_first() {
        let gate = SimulatedBiometric::new()
            .with_outcomes(vec![FaceGateOutcome::CameraUnavailable]);
        assert_eq!(gate.check("demo").await, FaceGateOutcome::CameraUnavailable);
        assert_eq!(
            gate.check("demo").await,
            FaceGateOutcome::Matched {
                freshly_enrolled: true
            }
        );
    }

    #[test]
    fn demo_list_is_stable() {
        let files = demo_files();
        assert_eq!(files.len(), 4);
        assert_eq!(files[2].name, "Science Chapter");
    }

    #[test]
    fn science_chapter_carries_a_media_marker() {
        assert!(demo_text("Science Chapter").contains("[IMAGE:"));
    }
}

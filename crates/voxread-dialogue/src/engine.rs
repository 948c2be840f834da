//! The dialogue state machine: Welcome → Login → FaceGate → Dashboard →
//! Reader, with language switching and logout available everywhere.
//!
//! One engine owns one session. Every mutation happens inside the handler for
//! the event being processed; the only concurrency in the system lives inside
//! the turn arbiter. Barge-in transcripts captured during auxiliary speech are
//! parked in `pending` and drained by the run loop, so intent dispatch is
//! never reentrant.

use crate::collab::{
    demo_files, demo_text, normalize_credential, BiometricGate, CredentialStore, DemoLibrary,
    DigestService, FaceGateOutcome, FileEntry, FileSource, InMemoryCredentials, LocalDigest,
    SimulatedBiometric,
};
use crate::config::EngineConfig;
use crate::error::{DialogueError, DialogueResult};
use crate::intent::{classify, extract_password, extract_slot_number, extract_username, normalize, Intent};
use crate::language;
use crate::local_files::LocalLibrary;
use crate::remote::{RemoteDigest, RemoteLibrary};
use crate::session::{LoginStep, Screen, Session};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use voxread_reader::{Document, ReadingCursor};
use voxread_voice::{SpeakResult, SpeechError, SpeechInput, SpeechOutput, TurnArbiter, Utterance};

pub(crate) const PROMPT_WELCOME: &str = "Welcome to VoxRead. I am your voice assistant for \
reading documents. If you are ready, please say hi.";
pub(crate) const PROMPT_USERNAME: &str = "Please tell me your username.";
pub(crate) const PROMPT_HELP_READER: &str = "You can say start reading, pause, resume, repeat, \
next, previous, summarize, explain, key points, describe, or logout.";

pub struct DialogueEngine {
    pub(crate) config: EngineConfig,
    pub(crate) session: Session,
    pub(crate) arbiter: TurnArbiter,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) biometric: Arc<dyn BiometricGate>,
    pub(crate) files: Arc<dyn FileSource>,
    pub(crate) digest: Arc<dyn DigestService>,
    pub(crate) discovered: Vec<FileEntry>,
    pub(crate) document: Option<Document>,
    pub(crate) cursor: ReadingCursor,
    /// Transcript captured by barge-in on auxiliary speech, handled by the
    /// run loop before anything else.
    pub(crate) pending: Option<String>,
}

impl DialogueEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
        credentials: Arc<dyn CredentialStore>,
        biometric: Arc<dyn BiometricGate>,
        files: Arc<dyn FileSource>,
        digest: Arc<dyn DigestService>,
    ) -> Self {
        let arbiter = TurnArbiter::new(output, input).with_backoff(config.backoff());
        Self {
            config,
            session: Session::default(),
            arbiter,
            credentials,
            biometric,
            files,
            digest,
            discovered: Vec::new(),
            document: None,
            cursor: ReadingCursor::default(),
            pending: None,
        }
    }

    /// Engine with the in-process collaborators: demo credentials, simulated
    /// biometric gate, demo library, heuristic digest.
    pub fn with_demo_collaborators(
        config: EngineConfig,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
    ) -> Self {
        Self::new(
            config,
            output,
            input,
            Arc::new(InMemoryCredentials::default()),
            Arc::new(SimulatedBiometric::new()),
            Arc::new(DemoLibrary),
            Arc::new(LocalDigest),
        )
    }

    /// Engine wired from configuration: remote collaborators when
    /// `api_base_url` is set, the local library and heuristics otherwise.
    pub fn from_config(
        config: EngineConfig,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
    ) -> DialogueResult<Self> {
        let (files, digest): (Arc<dyn FileSource>, Arc<dyn DigestService>) =
            match config.api_base_url.as_deref() {
                Some(base) => (
                    Arc::new(
                        RemoteLibrary::new(base)
                            .map_err(|e| DialogueError::Config(e.to_string()))?,
                    ),
                    Arc::new(
                        RemoteDigest::new(base)
                            .map_err(|e| DialogueError::Config(e.to_string()))?,
                    ),
                ),
                None => {
                    let mut library = LocalLibrary::from_home();
                    if !config.library_roots.is_empty() {
                        let roots = config.library_roots.iter().map(PathBuf::from).collect();
                        library = LocalLibrary::with_roots(roots);
                    }
                    (Arc::new(library), Arc::new(LocalDigest))
                }
            };
        Ok(Self::new(
            config,
            output,
            input,
            Arc::new(InMemoryCredentials::default()),
            Arc::new(SimulatedBiometric::new()),
            files,
            digest,
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cursor(&self) -> &ReadingCursor {
        &self.cursor
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn discovered(&self) -> &[FileEntry] {
        &self.discovered
    }

    pub fn arbiter(&self) -> &TurnArbiter {
        &self.arbiter
    }

    /// Drive the conversation until the speech input capability is disposed.
    pub async fn run(&mut self) -> DialogueResult<()> {
        self.say(PROMPT_WELCOME).await;
        loop {
            if let Some(raw) = self.pending.take() {
                self.handle_utterance(&raw).await;
                continue;
            }
            if self.reading_active() {
                self.drive_reading().await;
                continue;
            }
            let locale = self.session.input_locale.clone();
            match self.arbiter.listen(&locale).await {
                Ok(transcript) => self.handle_utterance(&transcript.text).await,
                Err(SpeechError::ChannelClosed) => {
                    info!("speech input closed; ending dialogue");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Classify and dispatch one utterance. Language changes and logout are
    /// available from every screen; everything else routes by screen.
    pub async fn handle_utterance(&mut self, raw: &str) {
        let intent = classify(raw);
        debug!(?intent, raw, screen = ?self.session.screen, "dispatch");
        match intent {
            Intent::ChangeLanguage(ref key) => return self.change_language(key).await,
            Intent::Logout => return self.logout().await,
            _ => {}
        }
        match self.session.screen {
            Screen::Welcome => self.on_welcome(&intent).await,
            Screen::Login => self.on_login(raw, &intent).await,
            Screen::FaceGate => self.run_face_gate().await,
            Screen::Dashboard => self.on_dashboard(raw, &intent).await,
            Screen::Reader => self.on_reader(raw, intent).await,
        }
    }

    // -- global transitions -------------------------------------------------

    async fn change_language(&mut self, key: &str) {
        match language::lookup(key) {
            Some(lang) => {
                self.session.change_language(lang);
                info!(language = lang.key, "language changed");
                self.say(&format!("Switched to {}.", lang.label)).await;
            }
            None => self.say("I do not support that language yet.").await,
        }
    }

    async fn logout(&mut self) {
        self.arbiter.cancel_all().await;
        self.session.reset();
        self.document = None;
        self.cursor.reset();
        self.discovered.clear();
        self.pending = None;
        self.say(&format!("You have been logged out. {PROMPT_WELCOME}"))
            .await;
    }

    // -- welcome ------------------------------------------------------------

    async fn on_welcome(&mut self, intent: &Intent) {
        match intent {
            Intent::Greeting | Intent::Confirm => {
                self.session.screen = Screen::Login;
                self.session.login_step = LoginStep::Username;
                self.say(PROMPT_USERNAME).await;
            }
            _ => self.say(PROMPT_WELCOME).await,
        }
    }

    // -- login --------------------------------------------------------------

    async fn on_login(&mut self, raw: &str, intent: &Intent) {
        match self.session.login_step {
            LoginStep::Greeting => {
                self.session.login_step = LoginStep::Username;
                self.say(PROMPT_USERNAME).await;
            }
            LoginStep::Username => {
                let name = extract_username(raw);
                if name.is_empty() {
                    self.say("I did not catch a name. Please tell me your username.")
                        .await;
                } else {
                    self.session.pending_username = name.clone();
                    self.session.login_step = LoginStep::ConfirmUsername;
                    self.say(&format!("I heard {name}. Is that correct?")).await;
                }
            }
            LoginStep::ConfirmUsername => match intent {
                Intent::Confirm => {
                    self.session.username = mem::take(&mut self.session.pending_username);
                    self.session.login_step = LoginStep::Password;
                    let username = self.session.username.clone();
                    self.say(&format!("Welcome {username}. Please say your password."))
                        .await;
                }
                _ => {
                    self.session.pending_username.clear();
                    self.session.login_step = LoginStep::Username;
                    self.say("Alright, let us try again. Please tell me your username.")
                        .await;
                }
            },
            LoginStep::Password => {
                let password = extract_password(raw);
                if password.is_empty() {
                    self.say("I did not catch that. Please say your password.")
                        .await;
                } else {
                    self.session.pending_password = password;
                    self.session.login_step = LoginStep::Verifying;
                    self.verify_credentials().await;
                }
            }
            LoginStep::Verifying => {
                self.say("One moment, I am still verifying.").await;
            }
        }
    }

    async fn verify_credentials(&mut self) {
        let username = self.session.username.clone();
        let spoken = mem::take(&mut self.session.pending_password);
        let stored = match self.credentials.lookup(&username).await {
            Ok(secret) => secret,
            Err(e) => {
                warn!(error = %e, "credential store unavailable; using built-in table");
                InMemoryCredentials::default()
                    .lookup(&username)
                    .await
                    .ok()
                    .flatten()
            }
        };
        let matched = stored
            .map(|secret| normalize_credential(&secret) == normalize_credential(&spoken))
            .unwrap_or(false);
        if matched {
            self.session.screen = Screen::FaceGate;
            self.say("Password accepted. Now let me verify your face. Please look at the camera.")
                .await;
            self.run_face_gate().await;
        } else {
            self.session.login_step = LoginStep::Password;
            self.say("That password does not match. Please say your password again.")
                .await;
        }
    }

    // -- face gate ----------------------------------------------------------

    /// One capture-and-match round. Failures keep the user here; any later
    /// utterance short of logout retries the gate.
    async fn run_face_gate(&mut self) {
        let username = self.session.username.clone();
        match self.biometric.check(&username).await {
            FaceGateOutcome::Matched { freshly_enrolled } => {
                self.session.screen = Screen::Dashboard;
                let enrolled = if freshly_enrolled {
                    "I have enrolled your face for next time. "
                } else {
                    ""
                };
                self.say(&format!(
                    "Face verified. {enrolled}Welcome to your dashboard, {username}. \
                     Say scan documents to hear your files."
                ))
                .await;
            }
            FaceGateOutcome::Mismatched => {
                self.say("Your face did not match the enrolled profile. Say try again to retry, or logout.")
                    .await;
            }
            FaceGateOutcome::NoFaceDetected => {
                self.say("I could not see a face. Please face the camera and say try again, or logout.")
                    .await;
            }
            FaceGateOutcome::CameraUnavailable => {
                self.say("The camera is not available right now. Say try again to retry, or logout.")
                    .await;
            }
        }
    }

    // -- dashboard ----------------------------------------------------------

    async fn on_dashboard(&mut self, raw: &str, intent: &Intent) {
        match intent {
            Intent::ScanFiles => self.scan_files().await,
            Intent::OpenFile | Intent::Unknown => self.try_open(raw).await,
            _ => {
                self.say("Say scan documents to hear your files, or open followed by a document name.")
                    .await;
            }
        }
    }

    async fn scan_files(&mut self) {
        self.discovered = match self.files.scan().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                debug!("file source empty; announcing demo list");
                demo_files()
            }
            Err(e) => {
                warn!(error = %e, "file source unavailable; announcing demo list");
                demo_files()
            }
        };
        let listed = self
            .discovered
            .iter()
            .enumerate()
            .map(|(i, f)| format!("Number {}: {}, {}.", i + 1, f.name, f.kind))
            .collect::<Vec<_>>()
            .join(" ");
        let count = self.discovered.len();
        self.say(&format!(
            "I found {count} documents. {listed} Say open followed by the name or number."
        ))
        .await;
    }

    async fn try_open(&mut self, raw: &str) {
        if self.discovered.is_empty() {
            self.say("I have not scanned your documents yet. Say scan documents first.")
                .await;
            return;
        }
        if let Some(slot) = extract_slot_number(raw) {
            if slot < self.discovered.len() {
                return self.open_entry(slot).await;
            }
        }
        let text = normalize(raw);
        let mut best: Option<(usize, usize)> = None; // (score, discovery index)
        for (i, entry) in self.discovered.iter().enumerate() {
            let score = entry
                .name
                .split_whitespace()
                .filter(|word| word.len() > 2)
                .filter(|word| text.contains(&word.to_lowercase()))
                .count();
            // Strictly-greater keeps the earliest discovery on ties.
            if score > 0 && best.map(|(s, _)| score > s).unwrap_or(true) {
                best = Some((score, i));
            }
        }
        match best {
            Some((_, index)) => self.open_entry(index).await,
            None => {
                self.say("I could not find that document. Say the number, like open number two, \
                          or scan documents to hear the list again.")
                    .await;
            }
        }
    }

    async fn open_entry(&mut self, index: usize) {
        let entry = self.discovered[index].clone();
        let text = match self.files.load_text(&entry.name).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => demo_text(&entry.name),
            Err(e) => {
                warn!(error = %e, name = %entry.name, "document text unavailable; using demo text");
                demo_text(&entry.name)
            }
        };
        let document = Document::load(entry.name.clone(), text, self.config.words_per_chunk);
        let sections = document.len();
        self.cursor.reset();
        self.document = Some(document);
        self.session.screen = Screen::Reader;
        self.say(&format!(
            "Opening {}. It has {sections} sections. Say start reading when you are ready.",
            entry.name
        ))
        .await;
    }

    // -- speech helpers -----------------------------------------------------

    pub(crate) fn utterance(&self, text: &str) -> Utterance {
        Utterance::new(text, self.session.output_locale.clone())
            .with_delivery(self.session.speech_rate, self.session.speech_volume)
    }

    /// Plain prompt speech, not interruptible.
    pub(crate) async fn say(&mut self, text: &str) {
        let utterance = self.utterance(text);
        self.arbiter.speak(utterance).await;
    }

    /// Longer derived-text speech with barge-in. A transcript that interrupts
    /// it is parked in `pending` for the run loop; it is never dispatched from
    /// inside the current handler.
    pub(crate) async fn say_interruptible(&mut self, text: &str) {
        let utterance = self.utterance(text);
        let locale = self.session.input_locale.clone();
        if let SpeakResult::Interrupted(t) = self.arbiter.speak_with_barge_in(utterance, &locale).await
        {
            self.pending = Some(t.text);
        }
    }
}

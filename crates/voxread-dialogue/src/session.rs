//! Conversation session state.
//!
//! One `Session` per connected user, owned by the dialogue engine and mutated
//! only inside the handler currently processing an event.

use crate::language::Language;

/// Top-level conversation screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Login,
    FaceGate,
    Dashboard,
    Reader,
}

/// Sub-steps of the login conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Greeting,
    Username,
    ConfirmUsername,
    Password,
    Verifying,
}

pub const RATE_MIN: f32 = 0.5;
pub const RATE_MAX: f32 = 2.0;
pub const RATE_STEP: f32 = 0.25;

/// Volume floor stays above zero so a "quieter" spiral can never mute the
/// reader entirely.
pub const VOLUME_MIN: f32 = 0.2;
pub const VOLUME_MAX: f32 = 1.0;
pub const VOLUME_STEP: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub screen: Screen,
    pub login_step: LoginStep,
    pub username: String,
    pub pending_username: String,
    pub pending_password: String,
    pub input_locale: String,
    pub output_locale: String,
    pub speech_rate: f32,
    pub speech_volume: f32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            screen: Screen::Welcome,
            login_step: LoginStep::Greeting,
            username: String::new(),
            pending_username: String::new(),
            pending_password: String::new(),
            input_locale: "en-US".to_string(),
            output_locale: "en-US".to_string(),
            speech_rate: 1.0,
            speech_volume: 1.0,
        }
    }
}

impl Session {
    /// Logout path: everything back to defaults.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// The single mutation site for locales. Input and output always move
    /// together; a mismatched pair produces unusable recognition.
    pub fn change_language(&mut self, language: &Language) {
        self.input_locale = language.input_locale.to_string();
        self.output_locale = language.output_locale.to_string();
    }

    /// Adjust speaking rate by `delta`, clamped. Returns the new rate, which
    /// applies from the next utterance onward.
    pub fn adjust_rate(&mut self, delta: f32) -> f32 {
        self.speech_rate = (self.speech_rate + delta).clamp(RATE_MIN, RATE_MAX);
        self.speech_rate
    }

    /// Adjust volume by `delta`, clamped. Returns the new volume.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.speech_volume = (self.speech_volume + delta).clamp(VOLUME_MIN, VOLUME_MAX);
        self.speech_volume
    }
}

//! Error types for the dialogue layer.

use thiserror::Error;
use voxread_voice::SpeechError;

pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors that end a dialogue run. Collaborator failures never appear here:
/// they are absorbed by local fallbacks so the conversation can proceed.
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("configuration error: {0}")]
    Config(String),
}

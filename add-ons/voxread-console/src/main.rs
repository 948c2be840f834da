//! VoxRead console — the dialogue engine behind a terminal.
//!
//! Typed lines stand in for recognized speech; spoken output prints with a
//! per-word pacing delay so barge-in behaves like it does against a real
//! synthesizer: type a command while a long section is printing and the
//! remainder is discarded. Set `TTS_API_KEY` to render speech remotely
//! instead, and `VOXREAD_API_BASE_URL` to use a companion reader service.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxread_dialogue::{DialogueEngine, EngineConfig};
use voxread_voice::{
    Recognition, RemoteTts, SpeakOutcome, SpeechError, SpeechInput, SpeechOutput, Utterance,
};

/// Pacing for printed speech, scaled by the utterance rate.
const PRINT_MS_PER_WORD: u64 = 120;

struct ConsoleOutput;

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    async fn speak(&self, utterance: Utterance, cancel: CancellationToken) -> SpeakOutcome {
        println!("🔊 {}", utterance.text);
        let words = utterance.text.split_whitespace().count().max(1) as u64;
        let pace =
            Duration::from_millis(PRINT_MS_PER_WORD * words).div_f32(utterance.rate.max(0.1));
        tokio::select! {
            _ = tokio::time::sleep(pace) => SpeakOutcome::Finished,
            _ = cancel.cancelled() => {
                println!("   …interrupted");
                SpeakOutcome::Cancelled
            }
        }
    }
}

/// Stdin as the recognition capability. A line typed while no attempt is
/// open stays queued for the next one, so nothing the user types is lost.
struct ConsoleInput {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl ConsoleInput {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut reader = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: Mutex::new(rx),
        }
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    async fn recognize(
        &self,
        _locale: &str,
        cancel: CancellationToken,
    ) -> Result<Recognition, SpeechError> {
        let mut lines = self.lines.lock().await;
        tokio::select! {
            line = lines.recv() => match line {
                Some(text) if text.trim().is_empty() => Err(SpeechError::NoSpeech),
                Some(text) => Ok(Recognition::new(vec![text])),
                None => Err(SpeechError::ChannelClosed),
            },
            _ = cancel.cancelled() => Err(SpeechError::Aborted),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[voxread-console] .env not loaded: {e} (using system environment)");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "configuration load failed; using defaults");
        EngineConfig::default()
    });

    let output: Arc<dyn SpeechOutput> = match RemoteTts::from_env() {
        Ok(tts) => {
            tracing::info!("speech output: remote TTS");
            Arc::new(tts)
        }
        Err(_) => Arc::new(ConsoleOutput),
    };
    let input: Arc<dyn SpeechInput> = Arc::new(ConsoleInput::new());

    let mut engine =
        DialogueEngine::from_config(config, output, input).expect("engine configuration");

    println!("VoxRead console. Type what you would say; Ctrl-D ends the session.");
    tokio::select! {
        result = engine.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "dialogue ended with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("CTRL-C received; shutting down");
        }
    }
    println!("Goodbye.");
}

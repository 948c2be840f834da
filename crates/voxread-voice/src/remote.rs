//! Remote synthesis backend: OpenAI-compatible `/audio/speech` endpoint.
//!
//! Renders an utterance to audio via HTTP, then holds the channel open for the
//! utterance's estimated playback duration so barge-in keeps a real window to
//! land in. Playback hardware itself sits outside this crate; an integrator
//! can subclass the flow by wrapping [`RemoteTts`] and feeding the returned
//! bytes to a player.

use crate::channel::{SpeakOutcome, SpeechOutput, Utterance};
use crate::error::{SpeechError, VoiceResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Approximate natural speech pacing used to hold the channel open.
const PLAYBACK_MS_PER_WORD: u64 = 330;

/// Voice name for an output locale on OpenAI-compatible TTS endpoints.
fn voice_for_locale(locale: &str) -> &'static str {
    match locale.split('-').next().unwrap_or("en") {
        "hi" | "kn" | "ta" | "te" | "ml" | "mr" | "bn" | "gu" | "pa" | "ur" | "or" | "as" => {
            "shimmer"
        }
        _ => "nova",
    }
}

/// Remote TTS client. Uses `TTS_API_URL` (default `https://api.openai.com/v1`),
/// `TTS_API_KEY`, and `TTS_MODEL` (default `tts-1`).
#[derive(Debug, Clone)]
pub struct RemoteTts {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl RemoteTts {
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("TTS_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("TTS_API_KEY")
            .map_err(|_| SpeechError::Config("TTS requires TTS_API_KEY".to_string()))?;
        let model = std::env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        Self::new(base_url, api_key, model)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    async fn synthesize(&self, utterance: &Utterance) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": utterance.text,
            "voice": voice_for_locale(&utterance.locale),
            "speed": utterance.rate,
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SpeechError::Synthesis(format!(
                "TTS API error {status}: {body}"
            )));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechOutput for RemoteTts {
    async fn speak(&self, utterance: Utterance, cancel: CancellationToken) -> SpeakOutcome {
        if utterance.text.trim().is_empty() {
            return SpeakOutcome::Finished;
        }
        let bytes = tokio::select! {
            rendered = self.synthesize(&utterance) => match rendered {
                Ok(bytes) => bytes,
                Err(e) => return SpeakOutcome::Failed(e.to_string()),
            },
            _ = cancel.cancelled() => return SpeakOutcome::Cancelled,
        };
        debug!(bytes = bytes.len(), "synthesized utterance");

        let words = utterance.text.split_whitespace().count().max(1) as u64;
        let playback = Duration::from_millis(PLAYBACK_MS_PER_WORD * words)
            .div_f32(utterance.rate.max(0.1));
        tokio::select! {
            _ = tokio::time::sleep(playback) => SpeakOutcome::Finished,
            _ = cancel.cancelled() => SpeakOutcome::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_selection_by_locale() {
        assert_eq!(voice_for_locale("en-US"), "nova");
        assert_eq!(voice_for_locale("hi-IN"), "shimmer");
        assert_eq!(voice_for_locale("kn-IN"), "shimmer");
        assert_eq!(voice_for_locale(""), "nova");
    }
}

//! Engine configuration: an optional `voxread.toml` plus `VOXREAD_*`
//! environment overrides. Unset values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use voxread_voice::BackoffPolicy;

fn default_words_per_chunk() -> usize {
    voxread_reader::DEFAULT_WORDS_PER_CHUNK
}

fn default_retry_short_ms() -> u64 {
    250
}

fn default_retry_long_ms() -> u64 {
    800
}

/// | Setting | Default | Description |
/// |---------|---------|-------------|
/// | VOXREAD_WORDS_PER_CHUNK | 80 | Word budget per spoken chunk. |
/// | VOXREAD_RETRY_SHORT_MS | 250 | Backoff after a benign recognition miss. |
/// | VOXREAD_RETRY_LONG_MS | 800 | Backoff after a recognition failure. |
/// | VOXREAD_API_BASE_URL | unset | Companion service for files and summaries. |
/// | VOXREAD_LIBRARY_ROOTS | home folders | Extra directories to scan for documents. |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_words_per_chunk")]
    pub words_per_chunk: usize,
    #[serde(default = "default_retry_short_ms")]
    pub retry_short_ms: u64,
    #[serde(default = "default_retry_long_ms")]
    pub retry_long_ms: u64,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub library_roots: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            words_per_chunk: default_words_per_chunk(),
            retry_short_ms: default_retry_short_ms(),
            retry_long_ms: default_retry_long_ms(),
            api_base_url: None,
            library_roots: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load from `voxread.toml` (if present) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("voxread").required(false))
            .add_source(config::Environment::with_prefix("VOXREAD"))
            .build()?
            .try_deserialize()
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_millis(self.retry_short_ms),
            Duration::from_millis(self.retry_long_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.words_per_chunk, 80);
        assert_eq!(cfg.backoff().retry_short, Duration::from_millis(250));
        assert_eq!(cfg.backoff().retry_long, Duration::from_millis(800));
        assert!(cfg.api_base_url.is_none());
    }

    #[test]
    fn empty_sources_deserialize_to_defaults() {
        let cfg: EngineConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }
}

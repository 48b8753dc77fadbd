//! Narration output.
//!
//! The walk session hands narration cues to a [`NarrationSink`]. Audio
//! playback lives outside this crate; [`LoggingNarrator`] writes the
//! narration to the log and keeps a transcript.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Narration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
}

/// Speech parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechOptions {
    /// BCP 47 language tag
    pub language: String,
    /// 0.5 - 2.0, where 1.0 is normal
    pub rate: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "vi-VN".to_string(),
            rate: 1.0,
        }
    }
}

impl SpeechOptions {
    /// Set rate, clamped to 0.5 - 2.0
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.clamp(0.5, 2.0);
        self
    }
}

/// Trait for narration outputs
pub trait NarrationSink: Send + Sync {
    /// Start speaking, replacing anything in progress
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), NarrationError>;

    /// Stop current speech
    fn stop(&self);

    /// Check if currently speaking
    fn is_speaking(&self) -> bool;
}

/// Narrator that logs instead of producing audio.
#[derive(Debug, Default)]
pub struct LoggingNarrator {
    transcript: Mutex<Vec<String>>,
    speaking: Mutex<bool>,
}

impl LoggingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl NarrationSink for LoggingNarrator {
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), NarrationError> {
        let preview: String = text.chars().take(80).collect();
        tracing::info!("[{} x{:.1}] {}", options.language, options.rate, preview);

        self.transcript
            .lock()
            .map_err(|e| NarrationError::Unavailable(e.to_string()))?
            .push(text.to_string());
        if let Ok(mut speaking) = self.speaking.lock() {
            *speaking = true;
        }
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut speaking) = self.speaking.lock() {
            if *speaking {
                tracing::debug!("Narration stopped");
            }
            *speaking = false;
        }
    }

    fn is_speaking(&self) -> bool {
        self.speaking.lock().map(|s| *s).unwrap_or(false)
    }
}

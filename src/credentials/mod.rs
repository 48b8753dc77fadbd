//! API key rotation.
//!
//! Each external provider gets its own ordered key list. Callers ask for the
//! current key, and advance to the next one when a key runs out of quota.
//! Rotation is strictly sequential and never revisits an exhausted key until
//! the set is reset at the start of the next independent operation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Rotator shared between the routing chain and the story generator.
pub type SharedRotator = Arc<Mutex<CredentialRotator>>;

/// External services that consume API keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Primary walking directions (Google Directions)
    GoogleMaps,
    /// Secondary routing engine (OpenRouteService)
    OpenRouteService,
    /// Story generation LLM (Groq)
    Groq,
}

impl Provider {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::GoogleMaps => "Google Maps",
            Provider::OpenRouteService => "OpenRouteService",
            Provider::Groq => "Groq",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Credential errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("No API keys configured for {0}")]
    NoKeysConfigured(Provider),

    #[error("All API keys exhausted for {0}")]
    KeysExhausted(Provider),
}

/// Key usage statistics for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub total: usize,
    /// 1-based position of the current key
    pub current: usize,
    pub remaining: usize,
    pub has_keys: bool,
}

/// Ordered keys for one provider.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    keys: Vec<String>,
    index: usize,
    exhausted: bool,
    request_count: u32,
    max_requests_per_key: Option<u32>,
}

impl CredentialSet {
    /// Create a set, dropping blank keys and unfilled `YOUR_...` placeholders.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && !k.starts_with("YOUR_"))
            .collect();

        Self {
            keys,
            ..Default::default()
        }
    }

    /// Rotate proactively after this many requests on one key.
    pub fn with_max_requests_per_key(mut self, max: u32) -> Self {
        self.max_requests_per_key = (max > 0).then_some(max);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    fn current(&self, provider: Provider) -> Result<&str, CredentialError> {
        if self.keys.is_empty() {
            return Err(CredentialError::NoKeysConfigured(provider));
        }
        if self.exhausted {
            return Err(CredentialError::KeysExhausted(provider));
        }
        Ok(&self.keys[self.index])
    }

    fn advance(&mut self) -> bool {
        self.request_count = 0;

        if self.exhausted {
            return false;
        }

        if self.index + 1 < self.keys.len() {
            self.index += 1;
            true
        } else {
            self.index = self.keys.len();
            self.exhausted = true;
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.exhausted = false;
        self.request_count = 0;
    }

    fn stats(&self) -> KeyStats {
        let total = self.keys.len();
        KeyStats {
            total,
            current: (self.index + 1).min(total.max(1)),
            remaining: total.saturating_sub(self.index),
            has_keys: total > 0,
        }
    }
}

/// Per-provider key rotation.
#[derive(Debug, Clone, Default)]
pub struct CredentialRotator {
    sets: HashMap<Provider, CredentialSet>,
}

impl CredentialRotator {
    /// Create an empty rotator (every provider reports `NoKeysConfigured`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style key registration.
    pub fn with_set(mut self, provider: Provider, set: CredentialSet) -> Self {
        self.sets.insert(provider, set);
        self
    }

    /// Wrap for sharing between services.
    pub fn into_shared(self) -> SharedRotator {
        Arc::new(Mutex::new(self))
    }

    /// The key to use right now.
    pub fn current_key(&self, provider: Provider) -> Result<&str, CredentialError> {
        match self.sets.get(&provider) {
            Some(set) => set.current(provider),
            None => Err(CredentialError::NoKeysConfigured(provider)),
        }
    }

    /// Move to the next key. Returns false once every key has been used.
    pub fn advance(&mut self, provider: Provider) -> bool {
        let Some(set) = self.sets.get_mut(&provider) else {
            return false;
        };

        let advanced = set.advance();
        if advanced {
            tracing::info!(
                "Switched to {} API key {}/{}",
                provider,
                set.index + 1,
                set.len()
            );
        } else {
            tracing::warn!("All {} API keys exhausted", provider);
        }
        advanced
    }

    /// Back to the first key.
    pub fn reset(&mut self, provider: Provider) {
        if let Some(set) = self.sets.get_mut(&provider) {
            set.reset();
        }
    }

    pub fn reset_all(&mut self) {
        for set in self.sets.values_mut() {
            set.reset();
        }
        tracing::debug!("All API key indices reset");
    }

    /// Count a successful request against the current key.
    pub fn record_request(&mut self, provider: Provider) {
        if let Some(set) = self.sets.get_mut(&provider) {
            set.request_count = set.request_count.saturating_add(1);
        }
    }

    /// Whether the current key has served its configured request budget.
    pub fn should_rotate(&self, provider: Provider) -> bool {
        self.sets
            .get(&provider)
            .and_then(|set| set.max_requests_per_key.map(|max| set.request_count >= max))
            .unwrap_or(false)
    }

    pub fn has_keys(&self, provider: Provider) -> bool {
        self.sets.get(&provider).is_some_and(|s| !s.is_empty())
    }

    pub fn is_exhausted(&self, provider: Provider) -> bool {
        self.sets.get(&provider).is_some_and(|s| s.is_exhausted())
    }

    pub fn key_count(&self, provider: Provider) -> usize {
        self.sets.get(&provider).map_or(0, |s| s.len())
    }

    pub fn stats(&self, provider: Provider) -> KeyStats {
        self.sets
            .get(&provider)
            .map(|s| s.stats())
            .unwrap_or(KeyStats {
                total: 0,
                current: 0,
                remaining: 0,
                has_keys: false,
            })
    }
}

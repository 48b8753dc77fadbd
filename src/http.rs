//! Shared HTTP plumbing for the third-party providers.
//!
//! Every provider (directions or story generation) reports failures through
//! [`ProviderError`], which callers use to decide between retrying, rotating
//! the API key, or moving on to the next provider.

use crate::credentials::CredentialError;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider quota exceeded")]
    QuotaExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

impl ProviderError {
    /// Failures worth retrying on the same key after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }

    /// Failures that call for the next API key.
    pub fn is_quota(&self) -> bool {
        matches!(self, ProviderError::QuotaExceeded)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            ProviderError::InvalidRequest(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// Map a non-success HTTP status to a provider error.
///
/// Rejected keys (401/403) are treated like exhausted quota so the caller
/// moves on to the next key.
pub fn classify_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let detail = body.chars().take(200).collect::<String>();

    match status.as_u16() {
        429 | 401 | 403 => ProviderError::QuotaExceeded,
        s if (500..600).contains(&s) => {
            ProviderError::Network(format!("server returned {}: {}", status, detail))
        }
        _ => ProviderError::InvalidRequest(format!("status {}: {}", status, detail)),
    }
}

/// Build the HTTP client used by a provider.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

//! Provider error taxonomy (§7) and capability declarations (§4.4).

use std::collections::HashSet;

use thiserror::Error;

use crate::language::Language;
use crate::video::VideoKind;

/// Error taxonomy for provider operations. Variant names follow the kinds
/// listed in §7, not the Python exception names they were distilled from.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("download limit exceeded")]
    DownloadLimitExceeded,

    #[error("too many requests")]
    TooManyRequests,

    #[error("provider used before initialize()")]
    NotInitialized,

    #[error("operation timed out")]
    Timeout,

    #[error("provider error: {0}")]
    Other(String),
}

impl ProviderError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::ServiceUnavailable(err.to_string())
        } else {
            ProviderError::Other(err.to_string())
        }
    }
}

/// What a provider declares about itself at construction time.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub languages: HashSet<Language>,
    pub video_kinds: HashSet<VideoKind>,
    pub required_hash: Option<String>,
}

impl Capabilities {
    pub fn check_languages(&self, languages: &HashSet<Language>) -> HashSet<Language> {
        self.languages.intersection(languages).cloned().collect()
    }
}

/// Lifecycle state the pool tracks per provider session (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    New,
    Ready,
    Closed,
}

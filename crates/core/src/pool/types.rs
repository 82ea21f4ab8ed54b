//! Pool configuration and error types (C8).

use std::time::Duration;

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no provider registered under the name {0}")]
    UnknownProvider(String),

    #[error("provider {0} initialize() failed: {1}")]
    InitializeFailed(String, String),

    #[error("provider operation failed: {0}")]
    ProviderFailed(#[from] ProviderError),
}

/// Bounds on pool concurrency and per-call deadlines, matching §5.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_workers: usize,
    pub provider_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            provider_timeout: Duration::from_secs(20),
        }
    }
}

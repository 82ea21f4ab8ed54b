//! Engine configuration: TOML + environment, figment-merged, no
//! file-path loading (deliberately out of scope here).

mod loader;
mod types;

pub use loader::{load_config_from_env, load_config_from_str};
pub use types::{EngineConfig, OmdbSettings, OpenSubtitlesSettings, PoolSettings, ProvidersConfig, SelectionSettings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    ParseError(String),
}

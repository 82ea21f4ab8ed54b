//! Configuration loading: TOML fragment merged with environment overrides.
//!
//! There is deliberately no path-based loader here — reading a config file
//! off disk is a caller concern, not this crate's.

use figment::providers::{Env, Format, Toml};
use figment::Figment;

use super::types::EngineConfig;
use super::ConfigError;

/// Parse a TOML fragment directly, with no environment merge. Useful for
/// tests and for callers that already have the file contents in hand.
pub fn load_config_from_str(toml_str: &str) -> Result<EngineConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Merge a TOML fragment (usually embedded defaults, or an empty string)
/// with `SUBCORE_`-prefixed environment variables. Nesting uses a double
/// underscore (`SUBCORE_POOL__MAX_WORKERS=8`) so it doesn't collide with
/// the single underscores already inside snake_case field names.
pub fn load_config_from_env(toml_str: &str) -> Result<EngineConfig, ConfigError> {
    Figment::new()
        .merge(Toml::string(toml_str))
        .merge(Env::prefixed("SUBCORE_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

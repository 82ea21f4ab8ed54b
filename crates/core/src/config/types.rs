//! Configuration shape (§6's option table) for the whole engine.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration. Every field has a default so a caller can merge a
/// partial TOML fragment (or just environment overrides) over this and
/// still get a runnable engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pool: PoolSettings,
    pub selection: SelectionSettings,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub refiners: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool: PoolSettings::default(),
            selection: SelectionSettings::default(),
            providers: ProvidersConfig::default(),
            refiners: vec!["filesystem".to_string()],
        }
    }
}

/// §5's concurrency bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_workers: usize,
    #[serde(with = "humantime_seconds")]
    pub provider_timeout: Duration,
    /// Declaration order matters (§4.5's tie-break); this is the pool's
    /// provider list, in the order to register them.
    pub order: Vec<String>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_workers: 4,
            provider_timeout: Duration::from_secs(20),
            order: vec!["opensubtitles".to_string(), "napiprojekt".to_string()],
        }
    }
}

/// §6's `download_best_subtitles` option table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub languages: HashSet<String>,
    pub min_score: u8,
    pub hearing_impaired: Option<bool>,
    pub foreign_only: Option<bool>,
    pub only_one: bool,
    #[serde(with = "humantime_seconds_opt")]
    pub max_age: Option<Duration>,
    pub force: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            languages: HashSet::new(),
            min_score: 0,
            hearing_impaired: None,
            foreign_only: None,
            only_one: false,
            max_age: None,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub opensubtitles: Option<OpenSubtitlesSettings>,
    pub omdb: Option<OmdbSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenSubtitlesSettings {
    pub api_key: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbSettings {
    pub api_key: String,
    pub base_url: Option<String>,
}

mod humantime_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod humantime_seconds_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_consistent() {
        let config = EngineConfig::default();
        assert_eq!(config.pool.max_workers, 4);
        assert_eq!(config.pool.order, vec!["opensubtitles", "napiprojekt"]);
        assert!(config.selection.languages.is_empty());
    }

    #[test]
    fn deserializes_partial_toml_over_defaults() {
        let toml = r#"
            [selection]
            min_score = 50
            languages = ["eng", "fra"]
        "#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.selection.min_score, 50);
        assert_eq!(config.pool.max_workers, 4);
    }
}

//! The `Language` value type and its parse/error surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A three-letter language code with optional country and script.
///
/// Equality is structural: two languages are equal iff all three fields
/// match. There is no notion of "loose" equality anywhere in this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    pub alpha3: String,
    pub country: Option<String>,
    pub script: Option<String>,
}

impl Language {
    pub fn new(alpha3: impl Into<String>) -> Self {
        Self {
            alpha3: alpha3.into(),
            country: None,
            script: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// The `und` (undefined) language, used as a sentinel by the pipeline's
    /// `only_one` checks.
    pub fn undefined() -> Self {
        Self::new("und")
    }

    pub fn is_undefined(&self) -> bool {
        self.alpha3 == "und"
    }

    /// Render back to an IETF-ish tag (`eng`, `por-BR`, `zho-Hans`).
    pub fn to_ietf(&self) -> String {
        let mut tag = self.alpha3.clone();
        if let Some(country) = &self.country {
            tag.push('-');
            tag.push_str(country);
        }
        if let Some(script) = &self.script {
            tag.push('-');
            tag.push_str(script);
        }
        tag
    }

    /// Parse an IETF-ish tag into a `Language`.
    ///
    /// Accepts `eng`, `en`, `pt-BR`, `zh-Hans`. The two-letter alpha2 forms
    /// are mapped through a small built-in table; anything else is taken at
    /// face value as an alpha3 code (lowercased).
    pub fn from_ietf(tag: &str) -> Result<Self, LanguageParseError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LanguageParseError::Empty);
        }

        let mut parts = tag.split(['-', '_']);
        let primary = parts.next().unwrap();
        let alpha3 = alpha2_to_alpha3(primary)
            .map(str::to_string)
            .unwrap_or_else(|| primary.to_ascii_lowercase());

        if alpha3.len() != 3 {
            return Err(LanguageParseError::UnknownTag(tag.to_string()));
        }

        let mut country = None;
        let mut script = None;
        for part in parts {
            if part.len() == 4 {
                script = Some(capitalize_script(part));
            } else if part.len() == 2 {
                country = Some(part.to_ascii_uppercase());
            }
        }

        Ok(Self {
            alpha3,
            country,
            script,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ietf())
    }
}

fn alpha2_to_alpha3(alpha2: &str) -> Option<&'static str> {
    match alpha2.to_ascii_lowercase().as_str() {
        "en" => Some("eng"),
        "pt" => Some("por"),
        "fr" => Some("fra"),
        "de" => Some("deu"),
        "es" => Some("spa"),
        "it" => Some("ita"),
        "pl" => Some("pol"),
        "nl" => Some("nld"),
        "sv" => Some("swe"),
        "zh" => Some("zho"),
        "ja" => Some("jpn"),
        "ko" => Some("kor"),
        "ru" => Some("rus"),
        "ar" => Some("ara"),
        "und" => Some("und"),
        _ => None,
    }
}

fn capitalize_script(script: &str) -> String {
    let mut chars = script.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageParseError {
    #[error("empty language tag")]
    Empty,

    #[error("unknown language tag: {0}")]
    UnknownTag(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageConversionError {
    #[error("no converter registered for {0}")]
    UnknownConverter(String),

    #[error("language {0} is outside converter {1}'s domain")]
    OutOfDomain(String, String),
}

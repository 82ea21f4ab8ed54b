//! Process-wide registry mapping a converter name to a bidirectional codec
//! between [`Language`] and a provider-specific code.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::types::{Language, LanguageConversionError};

/// A bidirectional codec between [`Language`] and one provider's own
/// vocabulary (a string code, an integer id, whatever that provider uses).
pub trait LanguageConverter: Send + Sync {
    fn convert(&self, language: &Language) -> Result<String, LanguageConversionError>;
    fn reverse(&self, code: &str) -> Result<Language, LanguageConversionError>;
}

static REGISTRY: Lazy<RwLock<HashMap<String, Box<dyn LanguageConverter>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a converter under `name`. A later registration under the same
/// name silently replaces the earlier one.
pub fn register_converter(name: impl Into<String>, converter: Box<dyn LanguageConverter>) {
    let mut registry = REGISTRY.write().expect("language converter registry poisoned");
    registry.insert(name.into(), converter);
}

pub fn convert(name: &str, language: &Language) -> Result<String, LanguageConversionError> {
    let registry = REGISTRY.read().expect("language converter registry poisoned");
    let converter = registry
        .get(name)
        .ok_or_else(|| LanguageConversionError::UnknownConverter(name.to_string()))?;
    converter.convert(language)
}

pub fn reverse(name: &str, code: &str) -> Result<Language, LanguageConversionError> {
    let registry = REGISTRY.read().expect("language converter registry poisoned");
    let converter = registry
        .get(name)
        .ok_or_else(|| LanguageConversionError::UnknownConverter(name.to_string()))?;
    converter.reverse(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha2Converter;

    impl LanguageConverter for Alpha2Converter {
        fn convert(&self, language: &Language) -> Result<String, LanguageConversionError> {
            match language.alpha3.as_str() {
                "eng" => Ok("en".to_string()),
                "por" => Ok("pt".to_string()),
                other => Err(LanguageConversionError::OutOfDomain(
                    other.to_string(),
                    "alpha2".to_string(),
                )),
            }
        }

        fn reverse(&self, code: &str) -> Result<Language, LanguageConversionError> {
            match code {
                "en" => Ok(Language::new("eng")),
                "pt" => Ok(Language::new("por")),
                other => Err(LanguageConversionError::OutOfDomain(
                    other.to_string(),
                    "alpha2".to_string(),
                )),
            }
        }
    }

    #[test]
    fn registers_and_converts() {
        register_converter("alpha2-test", Box::new(Alpha2Converter));
        assert_eq!(convert("alpha2-test", &Language::new("eng")).unwrap(), "en");
        assert_eq!(reverse("alpha2-test", "pt").unwrap(), Language::new("por"));
    }

    #[test]
    fn unknown_converter_errors() {
        assert_eq!(
            convert("does-not-exist", &Language::new("eng")),
            Err(LanguageConversionError::UnknownConverter(
                "does-not-exist".to_string()
            ))
        );
    }

    #[test]
    fn out_of_domain_errors() {
        register_converter("alpha2-test-2", Box::new(Alpha2Converter));
        assert!(matches!(
            convert("alpha2-test-2", &Language::new("jpn")),
            Err(LanguageConversionError::OutOfDomain(_, _))
        ));
    }

    #[test]
    fn reregistration_replaces_silently() {
        register_converter("alpha2-test-3", Box::new(Alpha2Converter));
        register_converter("alpha2-test-3", Box::new(Alpha2Converter));
        assert!(convert("alpha2-test-3", &Language::new("eng")).is_ok());
    }
}

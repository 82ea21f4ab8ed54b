//! Language codes and the provider-code converter registry (C1).

mod converter;
mod types;

pub use converter::{convert, register_converter, reverse, LanguageConverter};
pub use types::{Language, LanguageConversionError, LanguageParseError};

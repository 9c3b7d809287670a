use serde::{Deserialize, Serialize};

/// Environment variables consulted for the active locale, highest priority first.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Languages a tagline can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Korean,
    Japanese,
}

impl Language {
    /// Parse a locale identifier such as `ko`, `ko-KR` or `ja_JP.UTF-8`.
    /// Anything unsupported falls back to English.
    pub fn from_locale(locale: &str) -> Self {
        let code = locale
            .split(|c: char| c == '-' || c == '_' || c == '.' || c == '@')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match code.as_str() {
            "ko" => Language::Korean,
            "ja" => Language::Japanese,
            _ => Language::English,
        }
    }

    /// Detect the language from the process environment.
    pub fn detect() -> Self {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|value| Self::from_locale(&value))
            .unwrap_or_default()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
            Language::Japanese => "ja",
        }
    }
}

/// Text with a mandatory English fallback and optional Korean and Japanese variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LocalizedText {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ko: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja: Option<String>,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ko: None,
            ja: None,
        }
    }

    pub fn with_ko(mut self, ko: impl Into<String>) -> Self {
        self.ko = Some(ko.into());
        self
    }

    pub fn with_ja(mut self, ja: impl Into<String>) -> Self {
        self.ja = Some(ja.into());
        self
    }

    pub fn for_language(&self, language: Language) -> &str {
        let translated = match language {
            Language::Korean => self.ko.as_deref(),
            Language::Japanese => self.ja.as_deref(),
            Language::English => None,
        };
        translated.unwrap_or(&self.en)
    }

    /// Resolve the display string for a locale identifier.
    pub fn resolve(&self, locale: &str) -> &str {
        self.for_language(Language::from_locale(locale))
    }
}

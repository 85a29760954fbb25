//! Display languages supported by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language tag sent with every recognition and generation request.
///
/// The wire values are the native language names the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "English")]
    English,
    #[serde(rename = "日本語")]
    Japanese,
    #[serde(rename = "中文")]
    Chinese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Japanese => "日本語",
            Language::Chinese => "中文",
        }
    }

    /// Map a UI locale code (`en`, `ja`, `zh`, `zh-CN`, ...) to a language.
    ///
    /// Unknown locales fall back to English.
    pub fn from_locale(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" => Language::Chinese,
            "ja" => Language::Japanese,
            _ => Language::English,
        }
    }

    pub fn locale(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
            Language::Chinese => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

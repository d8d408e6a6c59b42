use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Translator configuration
///
/// The JSON form uses camelCase keys:
/// ```json
/// {
///     "localeDirs": ["locale", "vendor/locale"],
///     "defaultLang": "fa",
///     "completionDelayMs": 2000
/// }
/// ```
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Locale roots in precedence order. The first one also decides which locales exist.
    pub locale_dirs: Vec<PathBuf>,
    /// Always part of the locale list, even without a directory on disk
    pub default_lang: String,
    /// Delay the "translated" notification of the event stream by this many milliseconds
    pub completion_delay_ms: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            locale_dirs: vec![PathBuf::from("locale")],
            default_lang: "fa".to_string(),
            completion_delay_ms: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.locale_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_lang(mut self, lang: &str) -> Self {
        self.default_lang = lang.to_string();
        self
    }

    pub fn with_completion_delay_ms(mut self, delay_ms: Option<u64>) -> Self {
        self.completion_delay_ms = delay_ms;
        self
    }

    /// Load options from a JSON file
    ///
    /// # Errors
    /// - File read errors
    /// - Invalid JSON, or a root that is not an object
    pub fn load(path: &Path) -> I18nResult<Options> {
        let content = fs::read_to_string(path).map_err(|e| {
            I18nError::Config(format!("Failed to read file '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            I18nError::Config(msg) => I18nError::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    pub fn from_json(content: &str) -> I18nResult<Options> {
        serde_json::from_str(content)
            .map_err(|e| I18nError::Config(format!("Failed to parse JSON: {}", e)))
    }
}

// Supported text languages and the persisted current-language setting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key under which the language code is stored in the preference file.
pub const STORAGE_KEY: &str = "app-language";

/// Languages the localisation tables are published in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "CN")]
    Cn,
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "JP")]
    Jp,
    #[serde(rename = "KR")]
    Kr,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "RU")]
    Ru,
    #[serde(rename = "TC")]
    Tc,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Cn,
        Language::En,
        Language::Jp,
        Language::Kr,
        Language::Mx,
        Language::Ru,
        Language::Tc,
    ];

    /// Two-letter code used in resource names.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Cn => "CN",
            Language::En => "EN",
            Language::Jp => "JP",
            Language::Kr => "KR",
            Language::Mx => "MX",
            Language::Ru => "RU",
            Language::Tc => "TC",
        }
    }

    /// Name of the language in itself, for pickers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Cn => "简体中文",
            Language::En => "English",
            Language::Jp => "日本語",
            Language::Kr => "한국어",
            Language::Mx => "Español",
            Language::Ru => "Русский",
            Language::Tc => "繁體中文",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidLanguage(s.to_string()))
    }
}

/// The user's selected language, optionally persisted to a JSON file.
#[derive(Debug)]
pub struct LanguagePreference {
    current: RwLock<Language>,
    path: Option<PathBuf>,
}

impl LanguagePreference {
    /// In-memory preference that is never written to disk.
    pub fn in_memory(language: Language) -> Self {
        Self {
            current: RwLock::new(language),
            path: None,
        }
    }

    /// Load the preference from `path`. A missing or unreadable file, or an
    /// unknown code, falls back to the default language.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language = read_stored_language(&path).unwrap_or_default();
        tracing::debug!("Loaded language preference {language} from {}", path.display());
        Self {
            current: RwLock::new(language),
            path: Some(path),
        }
    }

    pub fn current(&self) -> Language {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the language and persist it when backed by a file. On a failed
    /// write the current language is left as it was.
    pub fn set(&self, language: Language) -> Result<()> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(path) = &self.path {
            let mut entry = HashMap::new();
            entry.insert(STORAGE_KEY, language);
            let body = serde_json::to_string_pretty(&entry).map_err(|source| Error::Encode {
                resource: path.display().to_string(),
                source,
            })?;
            std::fs::write(path, body)?;
            tracing::info!("Saved language preference {language} to {}", path.display());
        }
        *current = language;
        Ok(())
    }
}

fn read_stored_language(path: &Path) -> Option<Language> {
    let text = std::fs::read_to_string(path).ok()?;
    let entries: HashMap<String, String> = serde_json::from_str(&text).ok()?;
    entries.get(STORAGE_KEY)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert_eq!("tc".parse::<Language>().unwrap(), Language::Tc);
        assert!("XX".parse::<Language>().is_err());
    }

    #[test]
    fn test_missing_file_defaults_to_cn() {
        let dir = tempfile::tempdir().unwrap();
        let pref = LanguagePreference::load(dir.path().join("language.json"));
        assert_eq!(pref.current(), Language::Cn);
    }

    #[test]
    fn test_set_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.json");

        let pref = LanguagePreference::load(&path);
        pref.set(Language::Jp).unwrap();
        assert_eq!(pref.current(), Language::Jp);

        let stored = std::fs::read_to_string(&path).unwrap();
        assert!(stored.contains("\"app-language\""));
        assert!(stored.contains("\"JP\""));

        let reloaded = LanguagePreference::load(&path);
        assert_eq!(reloaded.current(), Language::Jp);
    }

    #[test]
    fn test_failed_save_keeps_current_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("language.json");
        let pref = LanguagePreference::load(&path);

        let err = pref.set(Language::Ru).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {err:?}");
        assert_eq!(pref.current(), Language::Cn);
        assert!(!path.exists());
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.json");
        std::fs::write(&path, "{\"app-language\": \"Klingon\"}").unwrap();
        assert_eq!(LanguagePreference::load(&path).current(), Language::Cn);
    }
}

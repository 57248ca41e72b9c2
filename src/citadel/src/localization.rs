//! Localization tables
//!
//! Each language is assembled from several source groups (`citadel_gc`,
//! `citadel_heroes`, `citadel_mods`, ...). Groups must agree: a key that shows
//! up twice for the same language with different text is a [`LocalizationError::Collision`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Language every other language falls back to
pub const REFERENCE_LANGUAGE: &str = "english";

/// Suffix of the label variant of a key (`"BonusHealth"` → `"BonusHealth_postvalue_label"`)
pub const POSTVALUE_SUFFIX: &str = "_postvalue_label";

/// Metadata keys present in every group file
const SHARED_KEYS: &[&str] = &["Language"];

/// Keys that have no string of their own and are built from other keys,
/// joined with a space.
static OVERRIDES: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "MaxMoveSpeed" => &["StatDesc_MoveSpeed"],
    "TechRange" => &["StatDesc_Spirit", "StatDesc_Range"],
    "TechDuration" => &["StatDesc_Spirit", "StatDesc_Duration"],
    "CritDamageReceivedScale" => &["StatDesc_CritDamage", "StatDesc_Received"],
};

#[derive(Error, Debug, PartialEq)]
pub enum LocalizationError {
    #[error("Localization collision for '{key}' in {language} (group {group}): '{existing}' vs '{incoming}'")]
    Collision {
        language: String,
        group: String,
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("Missing localization for '{key}' in {language}")]
    Missing { key: String, language: String },
}

/// Merged per-language lookup tables
#[derive(Debug, Default)]
pub struct Localizations {
    languages: BTreeMap<String, BTreeMap<String, String>>,
    reported_misses: RefCell<BTreeSet<String>>,
}

impl Localizations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one group's key/value pairs into a language's table.
    ///
    /// Re-inserting an identical value is a no-op; a different value fails.
    pub fn merge<I, K, V>(&mut self, language: &str, group: &str, raw: I) -> Result<(), LocalizationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.languages.entry(language.to_string()).or_default();
        for (key, value) in raw {
            let key = key.into();
            if SHARED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value = value.into();
            match table.get(&key) {
                Some(existing) if *existing == value => {}
                Some(existing) => {
                    return Err(LocalizationError::Collision {
                        language: language.to_string(),
                        group: group.to_string(),
                        key,
                        existing: existing.clone(),
                        incoming: value,
                    });
                }
                None => {
                    table.insert(key, value);
                }
            }
        }
        Ok(())
    }

    /// Resolve a key to its display string.
    ///
    /// Lookup order: override table, direct key, `_postvalue_label` variant,
    /// the same two in English, then `fallback`.
    pub fn resolve(&self, key: &str, language: &str, fallback: Option<&str>) -> Result<String, LocalizationError> {
        if let Some(parts) = OVERRIDES.get(key) {
            let resolved = parts
                .iter()
                .map(|part| self.resolve(part, language, None))
                .collect::<Result<Vec<_>, _>>();
            if let Ok(resolved) = resolved {
                return Ok(resolved.join(" "));
            }
        }

        if let Some(value) = self.lookup(key, language) {
            return Ok(value.to_string());
        }

        if language == REFERENCE_LANGUAGE {
            self.report_miss(key);
        } else if let Some(value) = self.lookup(key, REFERENCE_LANGUAGE) {
            return Ok(value.to_string());
        }

        match fallback {
            Some(fallback) => Ok(fallback.to_string()),
            None => Err(LocalizationError::Missing {
                key: key.to_string(),
                language: language.to_string(),
            }),
        }
    }

    /// Resolve a key, treating a total miss as absent data
    pub fn try_resolve(&self, key: &str, language: &str) -> Option<String> {
        self.resolve(key, language, None).ok()
    }

    /// Quiet lookup for optional strings (descriptions, nested keys).
    ///
    /// Falls back to English but never consults overrides and never reports
    /// a miss.
    pub fn find(&self, key: &str, language: &str) -> Option<&str> {
        self.lookup(key, language)
            .or_else(|| self.lookup(key, REFERENCE_LANGUAGE))
    }

    /// Direct lookup with the postvalue variant, no fallback
    fn lookup(&self, key: &str, language: &str) -> Option<&str> {
        let table = self.languages.get(language)?;
        table
            .get(key)
            .or_else(|| table.get(&format!("{key}{POSTVALUE_SUFFIX}")))
            .map(String::as_str)
    }

    fn report_miss(&self, key: &str) {
        let mut reported = self.reported_misses.borrow_mut();
        if reported.insert(key.to_string()) {
            tracing::warn!(key, "missing {} localization", REFERENCE_LANGUAGE);
        }
    }

    /// Returns true if the key exists verbatim in the given language
    pub fn contains(&self, key: &str, language: &str) -> bool {
        self.languages
            .get(language)
            .is_some_and(|table| table.contains_key(key))
    }

    /// All languages with at least one merged group
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// The merged table of one language
    pub fn table(&self, language: &str) -> Option<&BTreeMap<String, String>> {
        self.languages.get(language)
    }

    /// Number of keys already reported as missing
    pub fn miss_count(&self) -> usize {
        self.reported_misses.borrow().len()
    }
}

//! Description text formatting
//!
//! Localized descriptions embed `{s:Name}` placeholders. A placeholder is
//! filled from the entity's own attributes first, then from the localization
//! table (whose text may contain further placeholders).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::localization::Localizations;

/// Suffix of an entity's description key
pub const DESCRIPTION_SUFFIX: &str = "_desc";

/// Nesting limit for placeholders that resolve to text with placeholders
pub const MAX_DEPTH: usize = 8;

/// Placeholders the game fills at runtime; left verbatim
pub const IGNORED_PLACEHOLDERS: &[&str] = &["ability_key", "BindingName", "HeroName"];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{s:([A-Za-z0-9_]+)\}").expect("valid placeholder pattern"));

#[derive(Error, Debug, PartialEq)]
pub enum DescriptionError {
    #[error("Unknown placeholder {{s:{name}}} in description of {key}")]
    UnknownPlaceholder { key: String, name: String },

    #[error("Placeholders nested deeper than {MAX_DEPTH} in description of {key}")]
    TooDeep { key: String },
}

pub struct DescriptionFormatter<'a> {
    localizations: &'a Localizations,
    language: &'a str,
}

impl<'a> DescriptionFormatter<'a> {
    pub fn new(localizations: &'a Localizations, language: &'a str) -> Self {
        Self {
            localizations,
            language,
        }
    }

    /// Format the `<key>_desc` string of an entity.
    ///
    /// Returns `Ok(None)` if the entity has no description.
    pub fn describe<F>(&self, key: &str, attribute: F) -> Result<Option<String>, DescriptionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let desc_key = format!("{key}{DESCRIPTION_SUFFIX}");
        let Some(text) = self.localizations.find(&desc_key, self.language) else {
            return Ok(None);
        };
        self.expand(key, text, &attribute, 0).map(Some)
    }

    /// Substitute every placeholder in `text`
    pub fn format<F>(&self, key: &str, text: &str, attribute: F) -> Result<String, DescriptionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.expand(key, text, &attribute, 0)
    }

    fn expand(
        &self,
        key: &str,
        text: &str,
        attribute: &dyn Fn(&str) -> Option<String>,
        depth: usize,
    ) -> Result<String, DescriptionError> {
        if depth > MAX_DEPTH {
            return Err(DescriptionError::TooDeep {
                key: key.to_string(),
            });
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();
            let name = name.as_str();

            if let Some(value) = attribute(name) {
                out.push_str(&value);
            } else if let Some(nested) = self.localizations.find(name, self.language) {
                out.push_str(&self.expand(key, nested, attribute, depth + 1)?);
            } else if IGNORED_PLACEHOLDERS.contains(&name) {
                out.push_str(whole.as_str());
            } else {
                return Err(DescriptionError::UnknownPlaceholder {
                    key: key.to_string(),
                    name: name.to_string(),
                });
            }
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(name: &str) -> Option<String> {
        match name {
            "Damage" => Some("40".to_string()),
            "Cooldown" => Some("7.5".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_format_attributes() {
        let loc = Localizations::new();
        let f = DescriptionFormatter::new(&loc, "english");
        assert_eq!(
            f.format("k", "Deals {s:Damage} every {s:Cooldown}s", attrs).unwrap(),
            "Deals 40 every 7.5s"
        );
    }

    #[test]
    fn test_nested_localization() {
        let loc = crate::fixtures::localizations();
        let f = DescriptionFormatter::new(&loc, "english");
        let regen = |name: &str| (name == "BonusHealthRegen").then(|| "3".to_string());
        assert_eq!(
            f.describe("upgrade_extra_regen", regen).unwrap().as_deref(),
            Some("Regenerates 3 HP/s.")
        );
        assert_eq!(f.describe("upgrade_old_relic", regen).unwrap(), None);
    }

    #[test]
    fn test_unknown_placeholder() {
        let loc = Localizations::new();
        let f = DescriptionFormatter::new(&loc, "english");
        assert_eq!(
            f.format("upgrade_x", "{s:Mystery}", attrs),
            Err(DescriptionError::UnknownPlaceholder {
                key: "upgrade_x".to_string(),
                name: "Mystery".to_string()
            })
        );
        assert_eq!(f.format("upgrade_x", "Press {s:ability_key}", attrs).unwrap(), "Press {s:ability_key}");
    }

    #[test]
    fn test_recursion_limit() {
        let mut loc = Localizations::new();
        loc.merge("english", "citadel_gc", [("Loop", "again {s:Loop}")])
            .unwrap();
        let f = DescriptionFormatter::new(&loc, "english");
        assert!(matches!(
            f.format("k", "{s:Loop}", attrs),
            Err(DescriptionError::TooDeep { .. })
        ));
    }
}

//! Tag configuration
//!
//! Loaded once from the embedded `share/changelog/tags.yaml`. Tests and
//! callers with their own vocabulary can build a [`TagConfig`] directly.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

const TAGS_YAML: &str = include_str!("../../../../share/changelog/tags.yaml");

static EMBEDDED: Lazy<TagConfig> =
    Lazy::new(|| serde_yaml::from_str(TAGS_YAML).expect("Failed to parse changelog/tags.yaml"));

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TagConfig {
    /// Tag for entries nothing else matched
    pub default_tag: String,
    /// Parent → children
    #[serde(default)]
    pub tag_tree: BTreeMap<String, Vec<String>>,
    /// Ordered `[variant, canonical]` pairs
    #[serde(default)]
    pub remap: Vec<(String, String)>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
}

impl TagConfig {
    /// The configuration shipped with the crate
    pub fn embedded() -> &'static TagConfig {
        &EMBEDDED
    }

    /// Canonical name of a tag, following the remap table
    pub fn canonical<'a>(&'a self, tag: &'a str) -> &'a str {
        self.remap
            .iter()
            .find(|(variant, _)| variant == tag)
            .map_or(tag, |(_, canonical)| canonical.as_str())
    }

    /// Surface variants that remap to `canonical`, in table order
    pub fn variants<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.remap
            .iter()
            .filter(move |(_, c)| c == canonical)
            .map(|(variant, _)| variant.as_str())
    }

    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignore.iter().any(|i| i == tag)
    }

    /// Parent of a tag in the static tree
    pub fn parent(&self, tag: &str) -> Option<&str> {
        self.tag_tree
            .iter()
            .find(|(_, children)| children.iter().any(|c| c == tag))
            .map(|(parent, _)| parent.as_str())
    }

    /// Every ancestor of a tag, nearest first
    pub fn ancestors(&self, tag: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut current = tag;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                tracing::warn!(tag, parent, "cycle in tag tree");
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }
}

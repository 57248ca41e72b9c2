//! Changelog tagging
//!
//! A changelog is plain text: `[ Heading ]` lines and `-` bullets. Each line
//! becomes a [`ChangelogEntry`] tagged with the entities, phrases and
//! heading it relates to, so per-entity history pages can be assembled later.
//!
//! Tags are accumulated across every document of a run in a
//! [`TaggingSession`], which produces the run's [`TagTaxonomy`] at the end.

pub mod config;
mod html;
pub(crate) mod icons;
mod tagger;
mod taxonomy;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::TagConfig;
pub use html::html_to_text;
pub use icons::{render_template, strip_templates};
pub use tagger::TaggingSession;
pub use taxonomy::{tag_group_drift, TagGroupDrift, TagTaxonomy, TagTree};

#[derive(Error, Debug, PartialEq)]
pub enum ChangelogError {
    #[error("Unclosed <{tag}> in changelog HTML")]
    UnclosedTag { tag: String },

    #[error("Closing </{tag}> without a matching opening tag in changelog HTML")]
    UnexpectedClosingTag { tag: String },
}

/// One line of a changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
    /// Heading pseudo-entry; carries no tags
    #[serde(rename = "Heading", default, skip_serializing_if = "std::ops::Not::not")]
    pub heading: bool,
}

impl ChangelogEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// All entries of one game version's changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogDocument {
    pub version: String,
    pub entries: Vec<ChangelogEntry>,
}

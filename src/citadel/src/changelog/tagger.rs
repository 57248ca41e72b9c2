//! Line-by-line changelog tagging

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use super::config::TagConfig;
use super::icons::{self, Candidate};
use super::taxonomy::TagTaxonomy;
use super::{ChangelogDocument, ChangelogEntry};
use crate::entity::{EntityKind, EntitySet};
use crate::wikitext::normalize_line;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*(.*?)\s*\]$").expect("valid heading pattern"));

/// Dropped from the end of heading tags
const HEADING_SUFFIX: &str = "Changes";

/// A heading seen truncated in real changelogs
const TRUNCATED_GAMEPLAY: &str = "Gamepla";

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    DefaultHeading,
    UnderHeading(String),
}

/// An entity that can be named in changelog text
#[derive(Debug, Clone)]
struct KnownEntity<'a> {
    name: &'a str,
    kind: EntityKind,
    slot: Option<&'a str>,
}

/// Everything tagged so far in this run
#[derive(Debug, Default)]
struct SeenTags {
    tags: BTreeSet<String>,
    groups: BTreeSet<String>,
    /// Entity-name tag → entity kind
    kinds: BTreeMap<String, EntityKind>,
    /// Entity-derived taxonomy edges, child → parent
    edges: BTreeMap<String, String>,
}

/// Tags changelog documents against one run's entity set.
///
/// Create one per run, feed it every document, then call
/// [`TaggingSession::finish`] for the taxonomy.
pub struct TaggingSession<'a> {
    config: &'a TagConfig,
    entities: Vec<KnownEntity<'a>>,
    seen: SeenTags,
}

impl<'a> TaggingSession<'a> {
    /// Session using the embedded tag configuration
    pub fn new(entities: &'a EntitySet) -> Self {
        Self::with_config(entities, TagConfig::embedded())
    }

    pub fn with_config(entities: &'a EntitySet, config: &'a TagConfig) -> Self {
        let entities = entities
            .taggable()
            .filter_map(|(kind, entity)| {
                let name = entity.display_name().filter(|n| !n.is_empty())?;
                Some(KnownEntity {
                    name,
                    kind,
                    slot: entity.get_str("Slot"),
                })
            })
            .collect();

        Self {
            config,
            entities,
            seen: SeenTags::default(),
        }
    }

    /// Split a changelog into tagged entries
    pub fn tag_document(&mut self, version: &str, text: &str) -> ChangelogDocument {
        let mut state = State::DefaultHeading;
        let mut entries = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(heading) = HEADING.captures(line).and_then(|c| c.get(1)) {
                let heading = heading.as_str().to_string();
                entries.push(ChangelogEntry {
                    description: heading.clone(),
                    tags: Vec::new(),
                    heading: true,
                });
                state = State::UnderHeading(heading);
                continue;
            }

            let description = normalize_line(line);
            let tags = self.discover(&description, &state);
            entries.push(ChangelogEntry {
                description,
                tags,
                heading: false,
            });
        }

        tracing::debug!(version, entries = entries.len(), "tagged changelog");
        ChangelogDocument {
            version: version.to_string(),
            entries,
        }
    }

    /// Replace tag mentions in every entry with icon templates
    pub fn embed_icons(&self, document: &mut ChangelogDocument) {
        for entry in document.entries.iter_mut().filter(|e| !e.heading) {
            let embedded = {
                let mut candidates = Vec::new();
                for tag in &entry.tags {
                    let kind = self.seen.kinds.get(tag).copied();
                    candidates.push(Candidate {
                        surface: tag,
                        tag,
                        kind,
                    });
                    for variant in self.config.variants(tag) {
                        candidates.push(Candidate {
                            surface: variant,
                            tag,
                            kind,
                        });
                    }
                }
                icons::embed_icons(&entry.description, candidates)
            };
            entry.description = embedded;
        }
    }

    /// Every tag registered so far
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.seen.tags
    }

    /// Tags that group other tags (entity types, phrases, headings)
    pub fn tag_groups(&self) -> &BTreeSet<String> {
        &self.seen.groups
    }

    pub fn finish(self) -> TagTaxonomy {
        TagTaxonomy::build(self.config, &self.seen.tags, &self.seen.groups, &self.seen.edges)
    }

    fn discover(&mut self, line: &str, state: &State) -> Vec<String> {
        let config = self.config;
        let mut registrar = Registrar {
            config,
            seen: &mut self.seen,
            found: Vec::new(),
        };

        for entity in &self.entities {
            if !line.contains(entity.name) {
                continue;
            }
            let Some(name) = registrar.register(entity.name, false) else {
                continue;
            };
            let kind_tag = entity.kind.label();
            registrar.register(kind_tag, true);

            let parent = match (entity.kind, entity.slot) {
                (EntityKind::Item, Some(slot)) => {
                    let slot_tag = format!("{slot} Item");
                    registrar.register(&slot_tag, true);
                    registrar.seen.edges.insert(slot_tag.clone(), kind_tag.to_string());
                    slot_tag
                }
                _ => kind_tag.to_string(),
            };
            registrar.seen.kinds.insert(name.clone(), entity.kind);
            registrar.seen.edges.insert(name, parent);
        }

        for phrase in &config.phrases {
            if line.contains(phrase.as_str()) {
                registrar.register(phrase, true);
            }
        }

        let tokens: BTreeSet<&str> = line
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|t| !t.is_empty())
            .collect();
        for word in &config.words {
            if tokens.contains(word.as_str()) {
                registrar.register(word, true);
            }
        }

        if let State::UnderHeading(heading) = state {
            registrar.register(&heading_tag(heading), true);
        }

        if registrar.found.is_empty() {
            registrar.register(&config.default_tag, true);
        }

        let mut found = registrar.found;
        if found.len() > 1 {
            found.retain(|t| *t != config.default_tag);
        }
        found
    }
}

/// Collects the tags of one line
struct Registrar<'s> {
    config: &'s TagConfig,
    seen: &'s mut SeenTags,
    found: Vec<String>,
}

impl Registrar<'_> {
    /// Register a tag with its ancestors. Returns the canonical name, or
    /// `None` if the tag is ignored.
    fn register(&mut self, tag: &str, group: bool) -> Option<String> {
        let config = self.config;
        let tag = tag.trim();
        let canonical = config.canonical(tag);
        if canonical.is_empty() || config.is_ignored(tag) || config.is_ignored(canonical) {
            return None;
        }

        self.push(canonical, group);
        for ancestor in config.ancestors(canonical) {
            self.push(ancestor, true);
        }
        Some(canonical.to_string())
    }

    fn push(&mut self, tag: &str, group: bool) {
        if !self.found.iter().any(|t| t == tag) {
            self.found.push(tag.to_string());
        }
        self.seen.tags.insert(tag.to_string());
        if group {
            self.seen.groups.insert(tag.to_string());
        }
    }
}

/// Tag derived from a heading: "Hero Gameplay Changes" → "Hero Gameplay"
fn heading_tag(heading: &str) -> String {
    let tag = heading.trim();
    let tag = tag.strip_suffix(HEADING_SUFFIX).unwrap_or(tag).trim_end();
    if tag.ends_with(TRUNCATED_GAMEPLAY) {
        format!("{tag}y")
    } else {
        tag.to_string()
    }
}

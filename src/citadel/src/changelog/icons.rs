//! Icon templates in changelog text

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::entity::EntityKind;

static TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{[^{}|]+\|([^{}|]*)(?:\|alt_name=([^{}]*))?\}\}").expect("valid template pattern")
});

/// Wiki template used for a tag
pub fn template_name(kind: Option<EntityKind>) -> &'static str {
    match kind {
        Some(EntityKind::Hero) => "HeroIcon",
        Some(EntityKind::Item) => "ItemIcon",
        Some(EntityKind::Ability) => "AbilityIcon",
        Some(EntityKind::Npc) | None => "PageRef",
    }
}

/// `{{Template|target}}`, or `{{Template|target|alt_name=surface}}` when the
/// text shown differs from the target
pub fn render_template(kind: Option<EntityKind>, target: &str, surface: &str) -> String {
    let name = template_name(kind);
    if surface == target {
        format!("{{{{{name}|{target}}}}}")
    } else {
        format!("{{{{{name}|{target}|alt_name={surface}}}}}")
    }
}

/// Replace every template with the text it displays
pub fn strip_templates(text: &str) -> String {
    TEMPLATE
        .replace_all(text, |caps: &Captures| {
            caps.get(2)
                .or_else(|| caps.get(1))
                .map_or(String::new(), |m| m.as_str().to_string())
        })
        .into_owned()
}

/// One way a tag can appear in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate<'a> {
    pub surface: &'a str,
    pub tag: &'a str,
    pub kind: Option<EntityKind>,
}

enum Segment {
    Plain(String),
    Embedded(String),
}

/// Embed each tag's icon at its first occurrence.
///
/// Candidates are tried longest surface first, and only against text that
/// has not been embedded yet, so a short tag is never matched inside a longer
/// one that already got its icon. Each tag is embedded at most once.
pub(crate) fn embed_icons(text: &str, mut candidates: Vec<Candidate<'_>>) -> String {
    candidates.sort_by(|a, b| {
        b.surface
            .len()
            .cmp(&a.surface.len())
            .then_with(|| a.surface.cmp(b.surface))
            .then_with(|| a.tag.cmp(b.tag))
    });

    let mut segments = vec![Segment::Plain(text.to_string())];
    let mut embedded: Vec<&str> = Vec::new();

    for candidate in &candidates {
        if candidate.surface.is_empty() || embedded.contains(&candidate.tag) {
            continue;
        }

        let hit = segments.iter().enumerate().find_map(|(i, segment)| match segment {
            Segment::Plain(plain) => find_word(plain, candidate.surface).map(|pos| (i, pos)),
            Segment::Embedded(_) => None,
        });
        let Some((index, pos)) = hit else {
            continue;
        };

        let Segment::Plain(plain) = segments.remove(index) else {
            continue;
        };
        let end = pos + candidate.surface.len();
        let icon = render_template(candidate.kind, candidate.tag, candidate.surface);
        segments.insert(index, Segment::Plain(plain[end..].to_string()));
        segments.insert(index, Segment::Embedded(icon));
        segments.insert(index, Segment::Plain(plain[..pos].to_string()));
        embedded.push(candidate.tag);
    }

    segments
        .into_iter()
        .map(|s| match s {
            Segment::Plain(s) | Segment::Embedded(s) => s,
        })
        .collect()
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of the first occurrence of `needle` that is not part of a
/// longer word
pub(crate) fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let starts_word = needle.chars().next().is_some_and(is_word_char);
    let ends_word = needle.chars().next_back().is_some_and(is_word_char);

    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !(starts_word && before.is_some_and(is_word_char))
            && !(ends_word && after.is_some_and(is_word_char))
    })
}

//! Wikitext formatting
//!
//! Turns plain changelog text into wiki markup: entity names become icon
//! templates, curated terms become links.

use std::collections::BTreeMap;

use crate::changelog::icons::{is_word_char, render_template};
use crate::entity::{EntityKind, EntityMap};

/// Arrow token as written in changelogs, and its typeset replacement
const ARROW: (&str, &str) = ("->", "→");

/// `-` at the start of a line becomes a wiki `*` bullet
pub fn normalize_bullet(line: &str) -> String {
    match line.strip_prefix('-') {
        Some(rest) => format!("*{rest}"),
        None => line.to_string(),
    }
}

/// Bullet and arrow normalization applied to changelog lines
pub fn normalize_line(line: &str) -> String {
    normalize_bullet(line).replace(ARROW.0, ARROW.1)
}

fn is_numeric_term(term: &str) -> bool {
    term.parse::<f64>().is_ok()
}

/// Build the name → markup table. Icons are claimed first, in hero, item,
/// ability order; links never overwrite a claimed name.
fn replacements(
    heroes: &EntityMap,
    items: &EntityMap,
    abilities: &EntityMap,
    link_targets: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    let groups = [
        (EntityKind::Hero, heroes),
        (EntityKind::Item, items),
        (EntityKind::Ability, abilities),
    ];
    for (kind, entities) in groups {
        for entity in entities.values().filter(|e| !e.is_disabled()) {
            let Some(name) = entity.display_name().filter(|n| !n.is_empty()) else {
                continue;
            };
            out.entry(name.to_string())
                .or_insert_with(|| render_template(Some(kind), name, name));
        }
    }

    for (term, target) in link_targets.into_iter().flatten() {
        if term.is_empty() || is_numeric_term(term) {
            continue;
        }
        out.entry(term.clone()).or_insert_with(|| {
            if term == target {
                format!("[[{target}]]")
            } else {
                format!("[[{target}|{term}]]")
            }
        });
    }

    out
}

/// Replace every whole-word occurrence of a mapped name, longest name first,
/// in one left-to-right pass. Inserted markup is never scanned again.
fn replace_names(text: &str, table: &BTreeMap<String, String>) -> String {
    let mut names: Vec<(&str, &str)> = table
        .iter()
        .map(|(name, markup)| (name.as_str(), markup.as_str()))
        .collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let hit = names.iter().find(|(name, _)| {
            if !rest.starts_with(name) {
                return false;
            }
            let starts_word = name.chars().next().is_some_and(is_word_char);
            let ends_word = name.chars().next_back().is_some_and(is_word_char);
            let after = rest[name.len()..].chars().next();
            !(starts_word && prev.is_some_and(is_word_char))
                && !(ends_word && after.is_some_and(is_word_char))
        });

        match hit {
            Some((name, markup)) => {
                out.push_str(markup);
                prev = name.chars().next_back();
                pos += name.len();
            }
            None => {
                let Some(c) = rest.chars().next() else {
                    break;
                };
                out.push(c);
                prev = Some(c);
                pos += c.len_utf8();
            }
        }
    }
    out
}

/// Format raw changelog text as wikitext.
///
/// Disabled entities and entities without a localized name are left as plain
/// text. `link_targets` maps extra terms to wiki page names.
pub fn format_wikitext(
    raw: &str,
    heroes: &EntityMap,
    items: &EntityMap,
    abilities: &EntityMap,
    link_targets: Option<&BTreeMap<String, String>>,
) -> String {
    let table = replacements(heroes, items, abilities, link_targets);

    let mut bulleted: String = raw
        .lines()
        .map(normalize_bullet)
        .collect::<Vec<_>>()
        .join("\n");
    if raw.ends_with('\n') {
        bulleted.push('\n');
    }

    replace_names(&bulleted, &table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    fn map(entries: &[(&str, Option<&str>, bool)]) -> EntityMap {
        entries
            .iter()
            .map(|(key, name, disabled)| {
                let mut e = Entity::new(*key, name.map(str::to_string));
                e.insert("Disabled", *disabled);
                (key.to_string(), e)
            })
            .collect()
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("- Cooldown 30s -> 25s"), "* Cooldown 30s → 25s");
        assert_eq!(normalize_line("Abrams - buffed"), "Abrams - buffed");
        assert_eq!(normalize_bullet("-> moved"), "*> moved");
    }

    #[test]
    fn test_icons_and_links() {
        let heroes = map(&[("hero_atlas", Some("Abrams"), false)]);
        let items = map(&[
            ("upgrade_extra_regen", Some("Extra Regen"), false),
            ("upgrade_old_relic", Some("Old Relic"), true),
        ]);
        let abilities = map(&[("ability_siphon_life", Some("Siphon Life"), false)]);
        let links = BTreeMap::from([
            ("Souls".to_string(), "Souls".to_string()),
            ("lane".to_string(), "Lanes".to_string()),
            ("500".to_string(), "Souls".to_string()),
            ("Abrams".to_string(), "Abrams (hero)".to_string()),
        ]);

        let raw = "- Abrams: Siphon Life now costs 500 Souls\n- Old Relic and Extra Regen removed from lane shop\n";
        let out = format_wikitext(raw, &heroes, &items, &abilities, Some(&links));
        assert_eq!(
            out,
            "* {{HeroIcon|Abrams}}: {{AbilityIcon|Siphon Life}} now costs 500 [[Souls]]\n\
             * Old Relic and {{ItemIcon|Extra Regen}} removed from [[Lanes|lane]] shop\n"
        );
    }

    #[test]
    fn test_longest_name_first() {
        let abilities = map(&[
            ("ability_barrage", Some("Barrage"), false),
            ("ability_heavy_barrage", Some("Heavy Barrage"), false),
        ]);
        let empty = EntityMap::new();
        let out = format_wikitext("Heavy Barrage and Barrage", &empty, &empty, &abilities, None);
        assert_eq!(
            out,
            "{{AbilityIcon|Heavy Barrage}} and {{AbilityIcon|Barrage}}"
        );
    }

    #[test]
    fn test_whole_words_only() {
        let links = BTreeMap::from([("Urn".to_string(), "Soul Urn".to_string())]);
        let empty = EntityMap::new();
        let out = format_wikitext("Return Fire; Urn; Urns", &empty, &empty, &empty, Some(&links));
        assert_eq!(out, "Return Fire; [[Soul Urn|Urn]]; Urns");
    }

    #[test]
    fn test_markup_not_rescanned() {
        // "Soul Urn" appears in the inserted link target
        let links = BTreeMap::from([
            ("Urn".to_string(), "Soul Urn".to_string()),
            ("Soul".to_string(), "Souls".to_string()),
        ]);
        let empty = EntityMap::new();
        let out = format_wikitext("Urn", &empty, &empty, &empty, Some(&links));
        assert_eq!(out, "[[Soul Urn|Urn]]");
    }
}

//! Full runs over a decompiled data directory
//!
//! Loading reads everything up front. Outputs are assembled in an
//! [`OutputSet`] and only written once the whole run succeeded, so a failing
//! run never leaves a half-updated output directory behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::attributes::AttributeOrder;
use crate::changelog::{html_to_text, tag_group_drift, ChangelogDocument, TagTaxonomy, TaggingSession};
use crate::entity::EntitySet;
use crate::localization::Localizations;
use crate::parsers::ability::parse_abilities;
use crate::parsers::hero::parse_heroes;
use crate::parsers::item::{component_edges, parse_items};
use crate::parsers::npc::parse_npcs;
use crate::parsers::ParseOptions;
use crate::raw::RawRecords;
use crate::wikitext::format_wikitext;
use crate::{Error, Result};

const SCRIPTS_DIR: &str = "scripts";
const LOCALIZATIONS_DIR: &str = "localizations";
const RAW_CHANGELOGS_DIR: &str = "changelogs/raw";
const LINK_TARGETS_FILE: &str = "changelogs/link_targets.json";

const JSON_DIR: &str = "json";
const VERSIONS_DIR: &str = "changelogs/versions";
const WIKITEXT_DIR: &str = "changelogs/wikitext";
const TAXONOMY_FILE: &str = "changelogs/tag-taxonomy.json";
const TAG_GROUPS_FILE: &str = "changelogs/tag-groups.json";

/// Wiki namespace for JSON data pages
pub const DATA_PAGE_PREFIX: &str = "Data:";
/// Title prefix of changelog pages
pub const CHANGELOG_PAGE_PREFIX: &str = "Update:";

// ============================================================================
// Loading
// ============================================================================

/// Raw decompiled scripts
#[derive(Debug, Clone, Default)]
pub struct RawGameData {
    pub heroes: RawRecords,
    pub abilities: RawRecords,
    pub generic: Value,
    pub npcs: RawRecords,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(io_error(path))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Directory entries sorted by file name
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error(dir))?;
    paths.sort();
    Ok(paths)
}

pub fn load_game_data(data_dir: &Path) -> Result<RawGameData> {
    let scripts = data_dir.join(SCRIPTS_DIR);
    let data = RawGameData {
        heroes: read_json(&scripts.join("heroes.json"))?,
        abilities: read_json(&scripts.join("abilities.json"))?,
        generic: read_json(&scripts.join("generic_data.json"))?,
        npcs: read_json(&scripts.join("npc_units.json"))?,
    };
    tracing::debug!(
        heroes = data.heroes.len(),
        abilities = data.abilities.len(),
        npcs = data.npcs.len(),
        "loaded game data"
    );
    Ok(data)
}

/// Key/value pairs of a localization file.
///
/// Accepts a flat object or the `{"lang": {"Tokens": {...}}}` layout.
/// Non-string values are skipped.
fn localization_entries(file: &Value) -> Vec<(String, String)> {
    let table = file
        .pointer("/lang/Tokens")
        .and_then(Value::as_object)
        .or_else(|| file.as_object());
    table
        .into_iter()
        .flatten()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
        .collect()
}

/// Merge `<group>/<group>_<language>.json` files, groups in sorted order
pub fn load_localizations(data_dir: &Path, options: &ParseOptions) -> Result<Localizations> {
    let mut loc = Localizations::new();

    for group_dir in sorted_entries(&data_dir.join(LOCALIZATIONS_DIR))? {
        if !group_dir.is_dir() {
            continue;
        }
        let Some(group) = group_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let prefix = format!("{group}_");

        for file in sorted_entries(&group_dir)? {
            if file.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(language) = file
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(prefix.as_str()))
            else {
                tracing::debug!(path = %file.display(), "not a localization file");
                continue;
            };
            if !options.wants_language(language) {
                continue;
            }

            let content: Value = read_json(&file)?;
            loc.merge(language, group, localization_entries(&content))?;
        }
    }

    tracing::info!(languages = loc.languages().count(), "loaded localizations");
    Ok(loc)
}

/// One raw changelog, already converted to plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChangelog {
    pub version: String,
    pub text: String,
}

/// Read `changelogs/raw/<version>.txt|.html`, in version order
pub fn load_changelogs(data_dir: &Path) -> Result<Vec<RawChangelog>> {
    let dir = data_dir.join(RAW_CHANGELOGS_DIR);
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "no raw changelogs");
        return Ok(Vec::new());
    }

    let mut changelogs = Vec::new();
    for path in sorted_entries(&dir)? {
        let (Some(version), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };
        let text = match ext {
            "txt" => read_text(&path)?,
            "html" => html_to_text(&read_text(&path)?)
                .map_err(Error::from)
                .map_err(Error::in_entity(version))?,
            _ => continue,
        };
        changelogs.push(RawChangelog {
            version: version.to_string(),
            text,
        });
    }
    Ok(changelogs)
}

/// Curated term → wiki page links, if the data directory has them
pub fn load_link_targets(data_dir: &Path) -> Result<Option<BTreeMap<String, String>>> {
    let path = data_dir.join(LINK_TARGETS_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

// ============================================================================
// Parsing
// ============================================================================

/// Everything a parse run produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedData {
    pub entities: EntitySet,
    pub meaningful_stats: BTreeMap<String, bool>,
    pub attribute_order: AttributeOrder,
    /// `(parent, component)` edges between enabled items
    pub component_edges: Vec<(String, String)>,
}

/// Parse every entity category. Heroes need the parsed abilities, so
/// abilities go first.
pub fn parse_entities(raw: &RawGameData, loc: &Localizations, options: &ParseOptions) -> Result<ParsedData> {
    let abilities = parse_abilities(&raw.abilities, loc, options)?;
    let items = parse_items(&raw.abilities, &raw.generic, loc, options)?;
    let heroes = parse_heroes(&raw.heroes, &raw.abilities, &abilities, loc, options)?;
    let npcs = parse_npcs(&raw.npcs, loc, options)?;

    tracing::info!(
        heroes = heroes.heroes.len(),
        abilities = abilities.len(),
        items = items.items.len(),
        npcs = npcs.len(),
        "parsed entities"
    );

    let component_edges = component_edges(&items);

    Ok(ParsedData {
        entities: EntitySet {
            heroes: heroes.heroes,
            abilities,
            items: items.items,
            npcs,
        },
        meaningful_stats: heroes.meaningful_stats,
        attribute_order: heroes.attribute_order,
        component_edges,
    })
}

// ============================================================================
// Changelogs
// ============================================================================

/// Tagged changelogs of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogRun {
    pub documents: Vec<ChangelogDocument>,
    /// Version → formatted wikitext
    pub wikitext: BTreeMap<String, String>,
    pub taxonomy: TagTaxonomy,
}

pub fn process_changelogs(
    changelogs: &[RawChangelog],
    entities: &EntitySet,
    link_targets: Option<&BTreeMap<String, String>>,
) -> ChangelogRun {
    let mut session = TaggingSession::new(entities);
    let mut documents = Vec::with_capacity(changelogs.len());
    let mut wikitext = BTreeMap::new();

    for changelog in changelogs {
        let mut document = session.tag_document(&changelog.version, &changelog.text);
        session.embed_icons(&mut document);
        documents.push(document);

        let formatted = format_wikitext(
            &changelog.text,
            &entities.heroes,
            &entities.items,
            &entities.abilities,
            link_targets,
        );
        wikitext.insert(changelog.version.clone(), formatted);
    }

    ChangelogRun {
        documents,
        wikitext,
        taxonomy: session.finish(),
    }
}

// ============================================================================
// Output
// ============================================================================

/// Pretty JSON with sorted keys and a trailing newline
pub fn to_sorted_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    // Value objects are BTreeMaps, so the round trip sorts every level
    let value = serde_json::to_value(value)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Output files of a run, relative path → content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    files: BTreeMap<PathBuf, String>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_json<T: Serialize>(&mut self, path: impl Into<PathBuf>, value: &T) -> Result<()> {
        let path = path.into();
        let text = to_sorted_json(value).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
        self.files.insert(path, text);
        Ok(())
    }

    pub fn add_text(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `root`
    pub fn write(&self, root: &Path) -> Result<()> {
        for (relative, content) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
            fs::write(&path, content).map_err(io_error(&path))?;
        }
        tracing::info!(files = self.files.len(), root = %root.display(), "wrote outputs");
        Ok(())
    }
}

pub fn entity_outputs(parsed: &ParsedData, loc: &Localizations) -> Result<OutputSet> {
    let json = Path::new(JSON_DIR);
    let mut out = OutputSet::new();
    out.add_json(json.join("hero-data.json"), &parsed.entities.heroes)?;
    out.add_json(json.join("ability-data.json"), &parsed.entities.abilities)?;
    out.add_json(json.join("item-data.json"), &parsed.entities.items)?;
    out.add_json(json.join("npc-data.json"), &parsed.entities.npcs)?;
    out.add_json(json.join("meaningful-stats.json"), &parsed.meaningful_stats)?;
    out.add_json(json.join("attribute-order.json"), &parsed.attribute_order)?;
    out.add_json(json.join("item-component-tree.json"), &parsed.component_edges)?;

    for language in loc.languages() {
        if let Some(table) = loc.table(language) {
            out.add_json(json.join(LOCALIZATIONS_DIR).join(format!("{language}.json")), table)?;
        }
    }
    Ok(out)
}

/// Result of [`run_parse`]
#[derive(Debug)]
pub struct ParseRun {
    pub parsed: ParsedData,
    pub localizations: Localizations,
    pub outputs: OutputSet,
}

/// Load, parse and write a full parse run.
///
/// Every output is built in memory first; `out_dir` is only touched once the
/// whole run has succeeded.
pub fn run_parse(data_dir: &Path, out_dir: &Path, options: &ParseOptions) -> Result<ParseRun> {
    let raw = load_game_data(data_dir)?;
    let localizations = load_localizations(data_dir, options)?;
    let parsed = parse_entities(&raw, &localizations, options)?;
    let outputs = entity_outputs(&parsed, &localizations)?;
    outputs.write(out_dir)?;
    Ok(ParseRun {
        parsed,
        localizations,
        outputs,
    })
}

pub fn changelog_outputs(run: &ChangelogRun) -> Result<OutputSet> {
    let mut out = OutputSet::new();
    for document in &run.documents {
        out.add_json(
            Path::new(VERSIONS_DIR).join(format!("{}.json", document.version)),
            &document.entries,
        )?;
    }
    for (version, text) in &run.wikitext {
        out.add_text(Path::new(WIKITEXT_DIR).join(format!("{version}.txt")), text.clone());
    }
    out.add_json(TAXONOMY_FILE, &run.taxonomy)?;
    out.add_json(TAG_GROUPS_FILE, &run.taxonomy.tag_groups)?;
    Ok(out)
}

/// Write changelog outputs, comparing tag groups with the previous run first
pub fn write_changelog_outputs(out_dir: &Path, run: &ChangelogRun) -> Result<()> {
    let outputs = changelog_outputs(run)?;

    let previous = out_dir.join(TAG_GROUPS_FILE);
    if previous.is_file() {
        let previous: Vec<String> = read_json(&previous)?;
        tag_group_drift(&previous, &run.taxonomy.tag_groups);
    }

    outputs.write(out_dir)
}

// ============================================================================
// Publishing
// ============================================================================

/// Pages to publish from a written output directory, `(title, content)`.
///
/// Top-level JSON files become `Data:<file>` pages, changelog wikitext
/// becomes `Update:<version>`.
pub fn collect_wiki_pages(out_dir: &Path) -> Result<Vec<(String, String)>> {
    let mut pages = Vec::new();

    let json = out_dir.join(JSON_DIR);
    if json.is_dir() {
        for path in sorted_entries(&json)? {
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            pages.push((format!("{DATA_PAGE_PREFIX}{name}"), read_text(&path)?));
        }
    }

    let wikitext = out_dir.join(WIKITEXT_DIR);
    if wikitext.is_dir() {
        for path in sorted_entries(&wikitext)? {
            let Some(version) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            pages.push((format!("{CHANGELOG_PAGE_PREFIX}{version}"), read_text(&path)?));
        }
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use tempfile::TempDir;

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fixtures::write_data_dir(dir.path());
        dir
    }

    fn parse_into(data: &Path, out: &Path) {
        run_parse(data, out, &ParseOptions::default()).unwrap();
    }

    fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let relative = path.strip_prefix(root).unwrap().to_path_buf();
                    files.insert(relative, fs::read(&path).unwrap());
                }
            }
        }
        files
    }

    #[test]
    fn test_load_localizations() {
        let data = data_dir();
        let loc = load_localizations(data.path(), &ParseOptions::default()).unwrap();
        assert_eq!(loc.languages().collect::<Vec<_>>(), ["english", "spanish"]);
        assert_eq!(loc.find("upgrade_extra_regen", "english"), Some("Extra Regen"));
        assert!(!loc.contains("Language", "english"));
    }

    #[test]
    fn test_load_localizations_filters_languages() {
        let data = data_dir();
        let options = ParseOptions {
            languages: vec!["german".to_string()],
            ..ParseOptions::default()
        };
        let loc = load_localizations(data.path(), &options).unwrap();
        // the reference language is always loaded
        assert_eq!(loc.languages().collect::<Vec<_>>(), ["english"]);
    }

    #[test]
    fn test_localization_entries_layouts() {
        let flat = serde_json::json!({"hero_atlas": "Abrams", "Count": 3});
        assert_eq!(
            localization_entries(&flat),
            [("hero_atlas".to_string(), "Abrams".to_string())]
        );
        let nested = serde_json::json!({"lang": {"Language": "english", "Tokens": {"hero_haze": "Haze"}}});
        assert_eq!(
            localization_entries(&nested),
            [("hero_haze".to_string(), "Haze".to_string())]
        );
    }

    #[test]
    fn test_entity_outputs_layout() {
        let data = data_dir();
        let out = TempDir::new().unwrap();
        parse_into(data.path(), out.path());

        for file in [
            "json/hero-data.json",
            "json/ability-data.json",
            "json/item-data.json",
            "json/npc-data.json",
            "json/meaningful-stats.json",
            "json/attribute-order.json",
            "json/item-component-tree.json",
            "json/localizations/english.json",
            "json/localizations/spanish.json",
        ] {
            assert!(out.path().join(file).is_file(), "{file} missing");
        }

        let items: Value = read_json(&out.path().join("json/item-data.json")).unwrap();
        assert_eq!(items["upgrade_extra_regen"]["Tier"], "2");
        assert_eq!(items["upgrade_extra_regen"]["Cost"], "1200");

        let heroes = read_text(&out.path().join("json/hero-data.json")).unwrap();
        assert!(heroes.ends_with("}\n"));
        assert!(heroes.find("\"Key\"").unwrap() < heroes.find("\"Name\"").unwrap());
    }

    #[test]
    fn test_parse_run_is_idempotent() {
        let data = data_dir();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        parse_into(data.path(), first.path());
        parse_into(data.path(), second.path());

        let first = read_tree(first.path());
        assert!(!first.is_empty());
        assert_eq!(first, read_tree(second.path()));
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let data = data_dir();
        let out = TempDir::new().unwrap();
        parse_into(data.path(), out.path());
        let before = read_tree(out.path());

        // a new item changes item-data.json, a broken hero fails the run
        let mut abilities: Value = read_json(&data.path().join("scripts/abilities.json")).unwrap();
        abilities["upgrade_extra_regen"]["m_iItemTier"] = Value::from("EModTier_3");
        fs::write(data.path().join("scripts/abilities.json"), abilities.to_string()).unwrap();
        let mut heroes: Value = read_json(&data.path().join("scripts/heroes.json")).unwrap();
        heroes["hero_haze"]["m_mapScalingStats"]["EBulletDamage"]["eScalingStat"] =
            Value::from("EMaxMoveSpeed");
        fs::write(data.path().join("scripts/heroes.json"), heroes.to_string()).unwrap();

        let err = run_parse(data.path(), out.path(), &ParseOptions::default()).unwrap_err();
        assert!(err.to_string().contains("hero_haze"));
        assert_eq!(read_tree(out.path()), before);
    }

    #[test]
    fn test_component_tree_output() {
        let data = data_dir();
        let out = TempDir::new().unwrap();
        let run = run_parse(data.path(), out.path(), &ParseOptions::default()).unwrap();
        assert_eq!(
            run.outputs.get("json/item-component-tree.json"),
            Some("[\n  [\n    \"upgrade_superior_regen\",\n    \"upgrade_extra_regen\"\n  ]\n]\n")
        );
        let edges: Value = read_json(&out.path().join("json/item-component-tree.json")).unwrap();
        assert_eq!(edges, serde_json::json!([["upgrade_superior_regen", "upgrade_extra_regen"]]));
    }

    #[test]
    fn test_changelog_run() {
        let data = data_dir();
        let options = ParseOptions::default();
        let raw = load_game_data(data.path()).unwrap();
        let loc = load_localizations(data.path(), &options).unwrap();
        let parsed = parse_entities(&raw, &loc, &options).unwrap();

        let changelogs = load_changelogs(data.path()).unwrap();
        let versions: Vec<_> = changelogs.iter().map(|c| c.version.as_str()).collect();
        assert_eq!(versions, ["2024-05-01", "2024-05-20"]);
        assert!(changelogs[1].text.starts_with("[ General Changes ]\n- Matchmaking"));

        let run = process_changelogs(&changelogs, &parsed.entities, None);
        let first = &run.documents[0];
        let abrams = first
            .entries
            .iter()
            .find(|e| e.description.contains("{{HeroIcon|Abrams}}"))
            .unwrap();
        assert!(abrams.has_tag("Siphon Life"));
        assert!(first.entries.iter().all(|e| !e.has_tag("Old Relic")));

        let second = &run.documents[1];
        let booster = second.entries.iter().find(|e| e.has_tag("Headshot Booster")).unwrap();
        assert!(booster.has_tag("Weapon Item"));
        assert!(!booster.has_tag("Urn"));

        assert!(run.wikitext["2024-05-01"].contains("* {{HeroIcon|Abrams}}: {{AbilityIcon|Siphon Life}}"));
        assert!(run.taxonomy.tags.iter().any(|t| t == "Headshot Booster"));

        let out = TempDir::new().unwrap();
        write_changelog_outputs(out.path(), &run).unwrap();
        assert!(out.path().join("changelogs/versions/2024-05-01.json").is_file());
        assert!(out.path().join("changelogs/wikitext/2024-05-20.txt").is_file());
        assert!(out.path().join(TAXONOMY_FILE).is_file());

        // a second run with the same groups leaves the persisted copy unchanged
        let groups = read_text(&out.path().join(TAG_GROUPS_FILE)).unwrap();
        write_changelog_outputs(out.path(), &run).unwrap();
        assert_eq!(read_text(&out.path().join(TAG_GROUPS_FILE)).unwrap(), groups);

        let pages = collect_wiki_pages(out.path()).unwrap();
        let titles: Vec<_> = pages.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, ["Update:2024-05-01", "Update:2024-05-20"]);
    }

    #[test]
    fn test_collect_data_pages() {
        let data = data_dir();
        let out = TempDir::new().unwrap();
        parse_into(data.path(), out.path());

        let pages = collect_wiki_pages(out.path()).unwrap();
        let titles: Vec<_> = pages.iter().map(|(t, _)| t.as_str()).collect();
        assert!(titles.contains(&"Data:hero-data.json"));
        assert!(!titles.iter().any(|t| t.contains("english")));
    }
}

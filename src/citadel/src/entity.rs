//! Parsed entity records
//!
//! Every parser emits [`Entity`] values: a stable engine `Key`, a localized
//! `Name` (null for unlocalized or unreleased content) and a flat map of
//! human-readable attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute name → change per scaling unit (one level, one point of spirit)
pub type ScalingMap = BTreeMap<String, f64>;

/// Entity records of one category, keyed by engine key
pub type EntityMap = BTreeMap<String, Entity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hero,
    Ability,
    Item,
    Npc,
}

impl EntityKind {
    /// Tag name used for this kind in changelogs
    pub fn label(self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Ability => "Ability",
            Self::Item => "Item",
            Self::Npc => "NPC",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One finalized hero, ability, item or NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(key: impl Into<String>, name: Option<String>) -> Self {
        Self {
            key: key.into(),
            name,
            attributes: BTreeMap::new(),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn get_str(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(Value::as_str)
    }

    pub fn get_f64(&self, attribute: &str) -> Option<f64> {
        self.get(attribute).and_then(Value::as_f64)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    /// `Disabled` attribute, false when absent
    pub fn is_disabled(&self) -> bool {
        self.get("Disabled").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Display name, if localized
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// The working set of one parse run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub heroes: EntityMap,
    pub abilities: EntityMap,
    pub items: EntityMap,
    pub npcs: EntityMap,
}

impl EntitySet {
    /// All entities that can be named in changelogs, with their kind.
    ///
    /// Disabled items are left out.
    pub fn taggable(&self) -> impl Iterator<Item = (EntityKind, &Entity)> {
        self.heroes
            .values()
            .map(|e| (EntityKind::Hero, e))
            .chain(self.abilities.values().map(|e| (EntityKind::Ability, e)))
            .chain(
                self.items
                    .values()
                    .filter(|e| !e.is_disabled())
                    .map(|e| (EntityKind::Item, e)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_serialization_is_flat() {
        let mut e = Entity::new("hero_atlas", Some("Abrams".to_string()));
        e.insert("MaxHealth", 550);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, json!({"Key": "hero_atlas", "Name": "Abrams", "MaxHealth": 550}));

        let back: Entity = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_null_name_serializes() {
        let e = Entity::new("upgrade_hidden", None);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, json!({"Key": "upgrade_hidden", "Name": null}));
    }

    #[test]
    fn test_taggable_skips_disabled_items() {
        let mut set = EntitySet::default();
        let mut on = Entity::new("upgrade_on", Some("On".to_string()));
        on.insert("Disabled", false);
        let mut off = Entity::new("upgrade_off", Some("Off".to_string()));
        off.insert("Disabled", true);
        set.items.insert(on.key.clone(), on);
        set.items.insert(off.key.clone(), off);
        let names: Vec<_> = set.taggable().filter_map(|(_, e)| e.display_name()).collect();
        assert_eq!(names, ["On"]);
    }
}

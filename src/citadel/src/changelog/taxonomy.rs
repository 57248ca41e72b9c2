//! Tag taxonomy produced by a tagging run

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::config::TagConfig;

/// Nested tag tree, parent → children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTree(pub BTreeMap<String, TagTree>);

impl TagTree {
    pub fn children(&self, tag: &str) -> Option<&TagTree> {
        self.0.get(tag)
    }

    /// Depth-first search for a tag at any level
    pub fn find(&self, tag: &str) -> Option<&TagTree> {
        self.0
            .iter()
            .find_map(|(name, sub)| if name == tag { Some(sub) } else { sub.find(tag) })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTaxonomy {
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
    #[serde(rename = "TagGroups")]
    pub tag_groups: Vec<String>,
    #[serde(rename = "Tree")]
    pub tree: TagTree,
}

impl TagTaxonomy {
    /// Combine the static tag tree with the entity edges seen during tagging.
    ///
    /// Entity edges win over the static tree when both give a parent.
    pub fn build(
        config: &TagConfig,
        tags: &BTreeSet<String>,
        groups: &BTreeSet<String>,
        entity_parents: &BTreeMap<String, String>,
    ) -> Self {
        let mut parents: BTreeMap<&str, &str> = BTreeMap::new();
        for (parent, children) in &config.tag_tree {
            for child in children {
                parents.entry(child.as_str()).or_insert(parent.as_str());
            }
        }
        for (child, parent) in entity_parents {
            parents.insert(child.as_str(), parent.as_str());
        }

        let mut nodes: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
        nodes.extend(config.tag_tree.keys().map(String::as_str));
        nodes.extend(parents.iter().flat_map(|(c, p)| [*c, *p]));

        let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (child, parent) in &parents {
            children.entry(*parent).or_default().push(*child);
        }

        let mut visited = BTreeSet::new();
        let mut tree = BTreeMap::new();
        for root in nodes.iter().filter(|n| !parents.contains_key(*n)) {
            tree.insert(root.to_string(), subtree(root, &children, &mut visited));
        }
        if visited.len() < nodes.len() {
            tracing::warn!(
                dropped = nodes.len() - visited.len(),
                "tags unreachable from any root, check tag_tree for cycles"
            );
        }

        Self {
            tags: tags.iter().cloned().collect(),
            tag_groups: groups.iter().cloned().collect(),
            tree: TagTree(tree),
        }
    }
}

fn subtree<'a>(
    node: &'a str,
    children: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut BTreeSet<&'a str>,
) -> TagTree {
    if !visited.insert(node) {
        return TagTree::default();
    }
    let mut out = BTreeMap::new();
    for child in children.get(node).into_iter().flatten() {
        if !visited.contains(child) {
            out.insert(child.to_string(), subtree(child, children, visited));
        }
    }
    TagTree(out)
}

/// Tag groups that appeared or disappeared since the previous run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroupDrift {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Compare this run's tag groups with the previous run's, warning on change
pub fn tag_group_drift(previous: &[String], current: &[String]) -> Option<TagGroupDrift> {
    let previous: BTreeSet<&String> = previous.iter().collect();
    let current: BTreeSet<&String> = current.iter().collect();
    if previous == current {
        return None;
    }

    let drift = TagGroupDrift {
        added: current.difference(&previous).map(|s| s.to_string()).collect(),
        removed: previous.difference(&current).map(|s| s.to_string()).collect(),
    };
    tracing::warn!(
        added = ?drift.added,
        removed = ?drift.removed,
        "tag groups changed since the last run"
    );
    Some(drift)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_merges_entity_edges() {
        let config = TagConfig::embedded();
        let tags: BTreeSet<String> = strings(&["Extra Regen", "Vitality Item", "Item", "Gameplay"])
            .into_iter()
            .collect();
        let groups: BTreeSet<String> = strings(&["Vitality Item", "Item", "Gameplay"])
            .into_iter()
            .collect();
        let edges = BTreeMap::from([
            ("Extra Regen".to_string(), "Vitality Item".to_string()),
            ("Vitality Item".to_string(), "Item".to_string()),
        ]);

        let taxonomy = TagTaxonomy::build(config, &tags, &groups, &edges);
        assert_eq!(taxonomy.tags, ["Extra Regen", "Gameplay", "Item", "Vitality Item"]);
        assert_eq!(taxonomy.tag_groups, ["Gameplay", "Item", "Vitality Item"]);

        let vitality = taxonomy.tree.find("Vitality Item").unwrap();
        assert!(vitality.children("Extra Regen").is_some());
        let gameplay = taxonomy.tree.children("Gameplay").unwrap();
        assert!(gameplay.children("Item").is_some());
        assert!(taxonomy.tree.children("General").is_some());
        assert!(taxonomy.tree.children("Item").is_none());
    }

    #[test]
    fn test_unparented_tags_are_roots() {
        let taxonomy = TagTaxonomy::build(
            &TagConfig::default(),
            &BTreeSet::from(["Other".to_string()]),
            &BTreeSet::new(),
            &BTreeMap::new(),
        );
        assert_eq!(
            serde_json::to_value(&taxonomy.tree).unwrap(),
            serde_json::json!({"Other": {}})
        );
    }

    #[test]
    fn test_tag_group_drift() {
        let previous = strings(&["Hero", "Item"]);
        assert_eq!(tag_group_drift(&previous, &strings(&["Item", "Hero"])), None);
        assert_eq!(
            tag_group_drift(&previous, &strings(&["Hero", "Map"])),
            Some(TagGroupDrift {
                added: strings(&["Map"]),
                removed: strings(&["Item"]),
            })
        );
    }
}

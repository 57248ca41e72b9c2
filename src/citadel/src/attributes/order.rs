//! Display order of stats per category

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const ATTRIBUTE_ORDER_YAML: &str = include_str!("../../../../share/attribute_order.yaml");

/// Category receiving stats that no configured category lists
pub const OTHER_CATEGORY: &str = "Other";

static CONFIGURED: Lazy<BTreeMap<String, Vec<String>>> = Lazy::new(|| {
    serde_yaml::from_str(ATTRIBUTE_ORDER_YAML).expect("Failed to parse attribute_order.yaml")
});

/// Category → ordered attribute keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeOrder {
    categories: BTreeMap<String, Vec<String>>,
}

impl AttributeOrder {
    /// Order the given keys by the configured categories.
    ///
    /// Configured keys that were not seen are left out; seen keys the config
    /// does not mention go to [`OTHER_CATEGORY`], sorted.
    pub fn arrange<'a, I>(seen: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seen: BTreeSet<&str> = seen.into_iter().collect();
        let mut placed = BTreeSet::new();
        let mut categories = BTreeMap::new();

        for (category, keys) in CONFIGURED.iter() {
            let present: Vec<String> = keys
                .iter()
                .filter(|k| seen.contains(k.as_str()))
                .cloned()
                .collect();
            placed.extend(present.iter().cloned());
            if !present.is_empty() {
                categories.insert(category.clone(), present);
            }
        }

        let unplaced: Vec<String> = seen
            .iter()
            .filter(|k| !placed.contains(**k))
            .map(|k| k.to_string())
            .collect();
        if !unplaced.is_empty() {
            categories
                .entry(OTHER_CATEGORY.to_string())
                .or_insert_with(Vec::new)
                .extend(unplaced);
        }

        Self { categories }
    }

    /// Category a key was filed under
    pub fn category_of(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| k == key))
            .map(|(c, _)| c.as_str())
    }

    pub fn keys(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrange_keeps_configured_order() {
        let order = AttributeOrder::arrange(["SustainedDPS", "BulletDamage", "MaxHealth"]);
        assert_eq!(order.keys("Weapon"), ["BulletDamage", "SustainedDPS"]);
        assert_eq!(order.keys("Vitality"), ["MaxHealth"]);
        assert!(order.keys("Spirit").is_empty());
    }

    #[test]
    fn test_arrange_appends_unseen() {
        let order = AttributeOrder::arrange(["Zeta", "BulletDamage", "Alpha"]);
        assert_eq!(order.keys(OTHER_CATEGORY), ["Alpha", "Zeta"]);
        assert_eq!(order.category_of("Zeta"), Some(OTHER_CATEGORY));
        assert_eq!(order.category_of("BulletDamage"), Some("Weapon"));
    }
}

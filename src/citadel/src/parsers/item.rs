//! Shop items

use serde_json::Value;
use std::collections::BTreeMap;

use super::{applies, display_value, flatten_properties, DescriptionFormatter, ParseError, ParseOptions};
use crate::attributes::{enums, map_enum, strip_prefix};
use crate::entity::{Entity, EntityMap};
use crate::localization::Localizations;
use crate::numbers::number_value;
use crate::raw::{get_flag, get_object, get_str, sanitize_number, RawRecords};
use crate::{Error, Result};

/// Prefix dropped from item property names (`AbilityCooldown` → `Cooldown`)
const PROPERTY_PREFIXES: &[&str] = &["Ability"];

/// Item key → keys of the items it is built from
pub type ComponentTree = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedItems {
    pub items: EntityMap,
    pub components: ComponentTree,
}

/// Per-tier prices from the generic data record
pub fn price_table(generic: &Value) -> Result<Vec<f64>> {
    let prices = generic
        .get("m_nItemPricePerTier")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::MissingField("m_nItemPricePerTier".to_string()))?;
    let prices = prices
        .iter()
        .map(|p| sanitize_number(p, "m_nItemPricePerTier"))
        .collect::<std::result::Result<_, _>>()?;
    Ok(prices)
}

pub fn parse_items(
    raw: &RawRecords,
    generic: &Value,
    loc: &Localizations,
    options: &ParseOptions,
) -> Result<ParsedItems> {
    let prices = price_table(generic)?;
    let mut parsed = ParsedItems::default();

    for (key, record) in raw {
        if get_str(record, &["m_eAbilityType"]) != Some("EAbilityType_Item") {
            continue;
        }

        let entity = parse_item(key, record, &prices, loc, options).map_err(Error::in_entity(key))?;

        let components: Vec<String> = record
            .get("m_vecComponentItems")
            .and_then(Value::as_array)
            .map(|c| c.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        if !components.is_empty() {
            parsed.components.insert(key.clone(), components);
        }

        parsed.items.insert(key.clone(), entity);
    }

    tracing::debug!(
        count = parsed.items.len(),
        disabled = parsed.items.values().filter(|i| i.is_disabled()).count(),
        "parsed items"
    );
    Ok(parsed)
}

fn parse_item(
    key: &str,
    record: &Value,
    prices: &[f64],
    loc: &Localizations,
    options: &ParseOptions,
) -> Result<Entity> {
    let mut entity = Entity::new(key, loc.try_resolve(key, &options.reference_language));

    let tier_literal = get_str(record, &["m_iItemTier"])
        .ok_or_else(|| ParseError::MissingField("m_iItemTier".to_string()))?;
    let tier = map_enum(tier_literal, &enums::ITEM_TIERS)?;
    let cost = tier
        .parse::<usize>()
        .ok()
        .and_then(|t| prices.get(t))
        .ok_or_else(|| ParseError::MissingPriceTier {
            tier: tier.to_string(),
        })?;
    entity.insert("Tier", tier);
    entity.insert("Cost", number_value(*cost).to_string());

    if let Some(slot) = get_str(record, &["m_eItemSlotType"]) {
        entity.insert("Slot", map_enum(slot, &enums::ITEM_SLOTS)?);
    }
    entity.insert("Disabled", get_flag(record, &["m_bDisabled"])?);

    let flat = flatten_properties(get_object(record, &["m_mapAbilityProperties"]))?;
    for (name, value) in flat.iter().filter(|(_, value)| applies(value)) {
        entity.insert(strip_prefix(name, PROPERTY_PREFIXES), value.clone());
    }

    let formatter = DescriptionFormatter::new(loc, &options.reference_language);
    let description = formatter.describe(key, |name| {
        entity
            .get(name)
            .or_else(|| entity.get(strip_prefix(name, PROPERTY_PREFIXES)))
            .or_else(|| flat.get(name))
            .and_then(display_value)
    })?;
    if let Some(description) = description {
        entity.insert("Description", description);
    }

    Ok(entity)
}

/// Component tree restricted to enabled items, as a sorted list of
/// `(parent, component)` edges
pub fn component_edges(parsed: &ParsedItems) -> Vec<(String, String)> {
    let enabled = |key: &str| parsed.items.get(key).is_some_and(|i| !i.is_disabled());
    parsed
        .components
        .iter()
        .filter(|(parent, _)| enabled(parent.as_str()))
        .flat_map(|(parent, children)| {
            children
                .iter()
                .filter(|c| enabled(c.as_str()))
                .map(move |c| (parent.clone(), c.clone()))
        })
        .collect()
}

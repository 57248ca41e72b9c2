//! Signature and ultimate abilities

use serde_json::{json, Map, Value};

use super::{applies, display_value, flatten_properties, DescriptionFormatter, ParseError, ParseOptions};
use crate::attributes::{enums, map_enum};
use crate::entity::{Entity, EntityMap};
use crate::localization::Localizations;
use crate::numbers::number_value;
use crate::raw::{get_number, get_object, get_str, sanitize_number, RawRecords};
use crate::{Error, Result};

/// Ability types emitted by this parser; the rest are weapons, items or
/// internal abilities
pub const PARSED_TYPES: &[&str] = &["Signature", "Ultimate"];

/// Upgrade kind that adds to a property's scaling instead of its base value
const ADD_TO_SCALE: &str = "AddToScale";

pub fn parse_abilities(raw: &RawRecords, loc: &Localizations, options: &ParseOptions) -> Result<EntityMap> {
    let mut abilities = EntityMap::new();

    for (key, record) in raw {
        let Some(ability_type) = get_str(record, &["m_eAbilityType"]) else {
            continue;
        };
        let label = map_enum(ability_type, &enums::ABILITY_TYPES)
            .map_err(Error::from)
            .map_err(Error::in_entity(key))?;
        if !PARSED_TYPES.contains(&label) {
            continue;
        }

        let entity = parse_ability(key, label, record, loc, options).map_err(Error::in_entity(key))?;
        abilities.insert(key.clone(), entity);
    }

    tracing::debug!(count = abilities.len(), "parsed abilities");
    Ok(abilities)
}

fn parse_ability(
    key: &str,
    label: &str,
    record: &Value,
    loc: &Localizations,
    options: &ParseOptions,
) -> Result<Entity> {
    let mut entity = Entity::new(key, loc.try_resolve(key, &options.reference_language));
    entity.insert("AbilityType", label);

    let properties = get_object(record, &["m_mapAbilityProperties"]);
    let flat = flatten_properties(properties)?;
    entity.attributes.extend(
        flat.iter()
            .filter(|(_, value)| applies(value))
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    let scaling = property_scaling(properties)?;
    if !scaling.is_empty() {
        entity.insert("Scaling", Value::Object(scaling));
    }

    let upgrades = parse_upgrades(record)?;
    if !upgrades.is_empty() {
        entity.insert("Upgrades", upgrades);
    }

    let formatter = DescriptionFormatter::new(loc, &options.reference_language);
    let description = formatter.describe(key, |name| {
        entity.get(name).or_else(|| flat.get(name)).and_then(display_value)
    })?;
    if let Some(description) = description {
        entity.insert("Description", description);
    }

    Ok(entity)
}

/// Property → `{Type, Value}` for properties with a stat scale function
fn property_scaling(properties: Option<&Map<String, Value>>) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    let Some(properties) = properties else {
        return Ok(out);
    };

    for (name, property) in properties {
        let Some(stat) = get_str(property, &["m_subclassScaleFunction", "m_eSpecificStatScaleType"]) else {
            continue;
        };
        let scale = get_number(property, &["m_subclassScaleFunction", "m_flStatScale"])?.unwrap_or(0.0);
        if scale == 0.0 {
            continue;
        }
        let stat = map_enum(stat, &enums::SCALING_STATS)?;
        out.insert(
            name.clone(),
            json!({"Type": stat, "Value": number_value(scale)}),
        );
    }
    Ok(out)
}

/// Ordered upgrade tiers, each a property → bonus mapping
fn parse_upgrades(record: &Value) -> Result<Vec<Value>> {
    let Some(tiers) = record.get("m_vecAbilityUpgrades").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(tiers.len());
    for (index, tier) in tiers.iter().enumerate() {
        let mut bonuses = Map::new();
        let upgrades = tier
            .get("m_vecPropertyUpgrades")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for upgrade in upgrades {
            let Some(prop) = get_str(upgrade, &["m_strPropertyName"]) else {
                continue;
            };
            let bonus = match upgrade.get("m_strBonus") {
                Some(raw) => sanitize_number(raw, prop)?,
                None => continue,
            };
            if bonus == 0.0 {
                continue;
            }

            let kind = match get_str(upgrade, &["m_eUpgradeType"]) {
                Some(t) => map_enum(t, &enums::UPGRADE_TYPES)?,
                None => "AddToBase",
            };
            if kind == ADD_TO_SCALE {
                let stat = get_str(upgrade, &["m_eScaleStatFilter"]).unwrap_or("ETechPower");
                let stat = map_enum(stat, &enums::SCALING_STATS)?;
                if let Some(first) = bonuses.get("Scale").and_then(|s| s.get("Prop")).and_then(Value::as_str) {
                    return Err(ParseError::DuplicateScaleUpgrade {
                        tier: index + 1,
                        first: first.to_string(),
                        second: prop.to_string(),
                    }
                    .into());
                }
                bonuses.insert(
                    "Scale".to_string(),
                    json!({"Prop": prop, "Value": number_value(bonus), "Type": stat}),
                );
            } else {
                bonuses.insert(prop.to_string(), number_value(bonus));
            }
        }

        out.push(Value::Object(bonuses));
    }
    Ok(out)
}

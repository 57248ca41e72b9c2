//! Heroes
//!
//! A hero record only lists the starting stats that differ from the shared
//! `hero_base` record. Parsing merges the two, resolves the bound abilities and
//! primary weapon, and computes per-level and per-spirit scaling.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{ParseError, ParseOptions};
use crate::attributes::{enums, map_enum, strip_prefix, units_to_meters, AttributeOrder, STAT_PREFIXES};
use crate::dps::{bullet_velocity, scaled_dps_delta, CurvePoint, DpsKind, WeaponStats};
use crate::entity::{Entity, EntityMap, ScalingMap};
use crate::localization::Localizations;
use crate::numbers::number_value;
use crate::raw::{get_flag, get_number, get_object, get_path, get_str, require_number, sanitize_number, RawRecords};
use crate::{Error, Result};

/// Record holding the stats shared by every hero
pub const BASE_RECORD: &str = "hero_base";

/// Stats stored as "1 + displayed value": (stat, offset, multiplier)
const DISPLAY_ADJUSTMENTS: &[(&str, f64, f64)] = &[
    ("CritDamageReceivedScale", -1.0, 100.0),
    ("TechRange", -1.0, 1.0),
    ("TechDuration", -1.0, 1.0),
    ("ReloadSpeed", -1.0, 1.0),
];

const WEAPON_SLOT: &str = "WeaponPrimary";

/// Only spirit-based scaling is supported in `m_mapScalingStats`
const SPIRIT_BASIS: &str = "Spirit";

pub const LEVEL_SCALING: &str = "LevelScaling";
pub const SPIRIT_SCALING: &str = "SpiritScaling";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHeroes {
    pub heroes: EntityMap,
    /// Stat → whether it varies across heroes or scales
    pub meaningful_stats: BTreeMap<String, bool>,
    pub attribute_order: AttributeOrder,
}

pub fn parse_heroes(
    raw_heroes: &RawRecords,
    raw_abilities: &RawRecords,
    abilities: &EntityMap,
    loc: &Localizations,
    options: &ParseOptions,
) -> Result<ParsedHeroes> {
    let base = match raw_heroes.get(BASE_RECORD) {
        Some(record) => starting_stats(record)
            .map_err(Error::from)
            .map_err(Error::in_entity(BASE_RECORD))?,
        None => {
            tracing::warn!("no {} record, heroes use their own stats only", BASE_RECORD);
            BTreeMap::new()
        }
    };

    let context = HeroContext {
        base: &base,
        raw_abilities,
        abilities,
        loc,
        language: &options.reference_language,
    };

    let mut heroes = EntityMap::new();
    for (key, record) in raw_heroes {
        if key == BASE_RECORD {
            continue;
        }
        let hero = context.parse(key, record).map_err(Error::in_entity(key))?;
        heroes.insert(key.clone(), hero);
    }

    let meaningful_stats = meaningful_stats(&heroes);
    let attribute_order = AttributeOrder::arrange(meaningful_stats.keys().map(String::as_str));
    tracing::debug!(count = heroes.len(), "parsed heroes");

    Ok(ParsedHeroes {
        heroes,
        meaningful_stats,
        attribute_order,
    })
}

struct HeroContext<'a> {
    base: &'a BTreeMap<String, f64>,
    raw_abilities: &'a RawRecords,
    abilities: &'a EntityMap,
    loc: &'a Localizations,
    language: &'a str,
}

impl HeroContext<'_> {
    fn parse(&self, key: &str, record: &Value) -> Result<Entity> {
        let mut stats = self.base.clone();
        stats.extend(starting_stats(record)?);

        let mut hero = Entity::new(key, self.loc.try_resolve(key, self.language));
        for (stat, value) in &stats {
            hero.insert(stat.clone(), number_value(debias(stat, *value)));
        }
        hero.insert("PlayerSelectable", get_flag(record, &["m_bPlayerSelectable"])?);
        hero.insert("Disabled", get_flag(record, &["m_bDisabled"])?);
        hero.insert("InDevelopment", get_flag(record, &["m_bInDevelopment"])?);

        let mut bound = Map::new();
        let mut weapon_key = None;
        for (slot, ability_key) in get_object(record, &["m_mapBoundAbilities"]).into_iter().flatten() {
            let Some(ability_key) = ability_key.as_str() else {
                continue;
            };
            let slot = map_enum(slot, &enums::ABILITY_SLOTS)?;
            if slot == WEAPON_SLOT {
                weapon_key = Some(ability_key);
                continue;
            }
            match self.abilities.get(ability_key) {
                Some(ability) => {
                    bound.insert(slot.to_string(), json!(ability));
                }
                None => {
                    tracing::debug!(hero = key, ability = ability_key, slot, "skipping unparsed bound ability");
                }
            }
        }
        hero.insert("BoundAbilities", Value::Object(bound));

        let weapon = match weapon_key {
            Some(weapon_key) => self.weapon(key, weapon_key, &mut hero)?,
            None => None,
        };

        let mut level = level_scaling(record, &stats)?;
        let mut spirit = spirit_scaling(record)?;
        if let Some(weapon) = &weapon {
            add_dps_deltas(weapon, &mut level);
            add_dps_deltas(weapon, &mut spirit);
        }
        hero.insert(LEVEL_SCALING, scaling_value(level));
        hero.insert(SPIRIT_SCALING, scaling_value(spirit));

        Ok(hero)
    }

    /// Insert the primary weapon's stats into the hero.
    ///
    /// A weapon key with no raw record is skipped.
    fn weapon(&self, hero_key: &str, weapon_key: &str, hero: &mut Entity) -> Result<Option<WeaponStats>> {
        let Some(record) = self.raw_abilities.get(weapon_key) else {
            tracing::debug!(hero = hero_key, weapon = weapon_key, "skipping missing weapon record");
            return Ok(None);
        };
        let info = get_path(record, &["m_WeaponInfo"])
            .ok_or_else(|| ParseError::MissingField(format!("{weapon_key}.m_WeaponInfo")))?;

        let stats = weapon_stats(info)?;
        let name = self.loc.try_resolve(weapon_key, self.language);
        hero.insert("WeaponName", name);
        hero.insert("BulletDamage", number_value(stats.bullet_damage));
        hero.insert("RoundsPerSecond", number_value(stats.rounds_per_second));
        hero.insert("BulletsPerShot", number_value(stats.bullets_per_shot));
        hero.insert("ClipSize", number_value(stats.clip_size));
        hero.insert("ReloadTime", number_value(stats.reload_time));
        hero.insert("ReloadSingle", stats.reload_single);
        hero.insert("ReloadDelay", number_value(stats.reload_delay));
        hero.insert("BurstDPS", number_value(stats.dps(DpsKind::Burst)));
        hero.insert("SustainedDPS", number_value(stats.dps(DpsKind::Sustained)));

        let speed = match get_path(info, &["m_BulletSpeedCurve", "m_spline"]) {
            Some(spline) => {
                let curve: Vec<CurvePoint> =
                    serde_json::from_value(spline.clone()).map_err(|e| ParseError::UnexpectedType {
                        field: "m_BulletSpeedCurve.m_spline".to_string(),
                        expected: "curve points",
                        found: e.to_string(),
                    })?;
                Some(bullet_velocity(&curve)?)
            }
            None => None,
        };
        hero.insert("BulletSpeed", meters(speed));
        hero.insert(
            "FalloffStartRange",
            meters(get_number(info, &["m_flDamageFalloffStartRange"])?),
        );
        hero.insert(
            "FalloffEndRange",
            meters(get_number(info, &["m_flDamageFalloffEndRange"])?),
        );

        Ok(Some(stats))
    }
}

fn meters(units: Option<f64>) -> Value {
    units_to_meters(units).map_or(Value::Null, number_value)
}

/// `m_mapStartingStats` with the stat prefix stripped
fn starting_stats(record: &Value) -> std::result::Result<BTreeMap<String, f64>, ParseError> {
    get_object(record, &["m_mapStartingStats"])
        .into_iter()
        .flatten()
        .map(|(stat, value)| {
            let n = sanitize_number(value, stat)?;
            Ok::<_, ParseError>((strip_prefix(stat, STAT_PREFIXES).to_string(), n))
        })
        .collect()
}

/// Displayed value of a stat stored with an offset
fn debias(stat: &str, raw: f64) -> f64 {
    DISPLAY_ADJUSTMENTS
        .iter()
        .find(|(name, ..)| *name == stat)
        .map_or(raw, |(_, offset, multiplier)| (raw + offset) * multiplier)
}

/// Read the raw weapon fields and derive fire rate.
///
/// Burst weapons fire `burst` shots per cycle, with `intra` seconds between
/// shots of one burst.
pub fn weapon_stats(info: &Value) -> std::result::Result<WeaponStats, ParseError> {
    let cycle = require_number(info, &["m_flCycleTime"])?;
    let burst = get_number(info, &["m_iBurstShotCount"])?.unwrap_or(1.0).max(1.0);
    let intra = get_number(info, &["m_flIntraBurstCycleTime"])?.unwrap_or(0.0);
    let period = cycle + intra * burst;
    if period <= 0.0 {
        return Err(ParseError::UnexpectedType {
            field: "m_flCycleTime".to_string(),
            expected: "positive fire period",
            found: period.to_string(),
        });
    }

    Ok(WeaponStats {
        bullet_damage: require_number(info, &["m_flBulletDamage"])?,
        rounds_per_second: burst / period,
        bullets_per_shot: get_number(info, &["m_iBullets"])?.unwrap_or(1.0),
        clip_size: get_number(info, &["m_iClipSize"])?.unwrap_or(0.0),
        reload_time: get_number(info, &["m_reloadDuration"])?.unwrap_or(0.0),
        reload_single: get_flag(info, &["m_bReloadSingleBullets"])?,
        reload_delay: get_number(info, &["m_flReloadSingleBulletsInitialDelay"])?.unwrap_or(0.0),
    })
}

/// Per-level deltas, with melee damage split into light and heavy
fn level_scaling(record: &Value, stats: &BTreeMap<String, f64>) -> Result<ScalingMap> {
    let mut level = ScalingMap::new();
    for (modifier, value) in get_object(record, &["m_mapStandardLevelUpUpgrades"]).into_iter().flatten() {
        let stat = map_enum(modifier, &enums::LEVEL_UP_MODIFIERS)?;
        level.insert(stat.to_string(), sanitize_number(value, modifier)?);
    }

    if let Some(delta) = level.remove("MeleeDamage") {
        let light = stats.get("LightMeleeDamage").copied().unwrap_or(0.0);
        let heavy = stats.get("HeavyMeleeDamage").copied().unwrap_or(0.0);
        if light == 0.0 {
            return Err(ParseError::InvalidMeleeRatio { light }.into());
        }
        level.insert("LightMeleeDamage".to_string(), delta);
        level.insert("HeavyMeleeDamage".to_string(), delta * heavy / light);
    }
    Ok(level)
}

/// Per-spirit-point deltas; every entry must scale with spirit
fn spirit_scaling(record: &Value) -> Result<ScalingMap> {
    let mut spirit = ScalingMap::new();
    for (stat, entry) in get_object(record, &["m_mapScalingStats"]).into_iter().flatten() {
        let name = strip_prefix(stat, STAT_PREFIXES);
        let basis = get_str(entry, &["eScalingStat"])
            .ok_or_else(|| ParseError::MissingField(format!("m_mapScalingStats.{stat}.eScalingStat")))?;
        let basis = map_enum(basis, &enums::SCALING_STATS)?;
        if basis != SPIRIT_BASIS {
            return Err(ParseError::ScalingBasisMismatch {
                stat: name.to_string(),
                expected: SPIRIT_BASIS.to_string(),
                found: basis.to_string(),
            }
            .into());
        }
        spirit.insert(name.to_string(), require_number(entry, &["flScale"])?);
    }
    Ok(spirit)
}

fn add_dps_deltas(weapon: &WeaponStats, scaling: &mut ScalingMap) {
    for kind in [DpsKind::Burst, DpsKind::Sustained] {
        let delta = scaled_dps_delta(weapon, scaling, kind);
        scaling.insert(kind.attribute().to_string(), delta);
    }
}

/// Scaling map as JSON, without zero deltas
fn scaling_value(scaling: ScalingMap) -> Value {
    let map: Map<String, Value> = scaling
        .into_iter()
        .map(|(stat, delta)| (stat, number_value(delta)))
        .filter(|(_, delta)| delta.as_f64() != Some(0.0))
        .collect();
    Value::Object(map)
}

/// Which stats are worth a column in a cross-hero comparison.
///
/// Only numeric attributes are stats. A stat is meaningful if at least two
/// heroes disagree on it (a missing value counts as its own value) or it
/// appears in any scaling map.
pub fn meaningful_stats(heroes: &EntityMap) -> BTreeMap<String, bool> {
    let is_stat = |v: &&Value| v.is_number();

    let mut keys: BTreeSet<&str> = BTreeSet::new();
    let mut scaled: BTreeSet<&str> = BTreeSet::new();
    for hero in heroes.values() {
        for (key, value) in &hero.attributes {
            if is_stat(&value) {
                keys.insert(key.as_str());
            }
        }
        for map in [LEVEL_SCALING, SPIRIT_SCALING] {
            if let Some(scaling) = hero.get(map).and_then(Value::as_object) {
                scaled.extend(scaling.keys().map(String::as_str));
            }
        }
    }
    keys.extend(scaled.iter().copied());

    keys.into_iter()
        .map(|key| {
            let distinct: BTreeSet<String> = heroes
                .values()
                .map(|h| h.get(key).filter(is_stat).unwrap_or(&Value::Null).to_string())
                .collect();
            (key.to_string(), distinct.len() > 1 || scaled.contains(key))
        })
        .collect()
}

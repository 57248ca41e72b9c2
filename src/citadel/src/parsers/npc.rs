//! NPC units
//!
//! Each archetype has its own raw shape, so dispatch goes through a fixed
//! key → parser table. Keys not in the table are skipped with a warning
//! rather than guessed at.

use serde_json::Value;
use std::collections::BTreeMap;

use super::{ParseMode, ParseOptions};
use crate::attributes::{strip_prefixes_deep, units_to_meters, FIELD_PREFIXES};
use crate::entity::{Entity, EntityMap};
use crate::localization::Localizations;
use crate::numbers::number_value;
use crate::raw::{get_number, RawRecords};
use crate::{Error, Result};

type Stats = BTreeMap<String, Value>;
type ArchetypeParser = fn(&Value) -> Result<Stats>;

/// Known NPC keys, their archetype label and parser
const ARCHETYPES: &[(&str, &str, ArchetypeParser)] = &[
    ("trooper_normal", "Trooper", parse_trooper),
    ("trooper_melee", "Trooper", parse_trooper),
    ("trooper_medic", "Trooper", parse_trooper),
    ("trooper_boss", "Trooper", parse_trooper),
    ("npc_boss_tier1", "Guardian", parse_guardian),
    ("npc_boss_tier2", "Walker", parse_walker),
    ("npc_boss_tier3", "Patron", parse_patron),
    ("neutral_trooper_weak", "Neutral", parse_neutral),
    ("neutral_trooper_normal", "Neutral", parse_neutral),
    ("neutral_trooper_strong", "Neutral", parse_neutral),
    ("npc_super_neutral", "MidBoss", parse_midboss),
    ("pickup_golden_statue", "Pickup", parse_pickup),
    ("pickup_breakable_crate", "Pickup", parse_pickup),
];

pub fn parse_npcs(raw: &RawRecords, loc: &Localizations, options: &ParseOptions) -> Result<EntityMap> {
    let mut npcs = EntityMap::new();

    for key in raw.keys() {
        if !ARCHETYPES.iter().any(|(known, ..)| *known == key.as_str()) {
            tracing::warn!(key = key.as_str(), "unknown NPC archetype, skipping");
        }
    }

    for (key, archetype, parser) in ARCHETYPES {
        let Some(record) = raw.get(*key) else {
            tracing::debug!(key, "NPC not present in this build");
            continue;
        };

        match parser(record) {
            Ok(stats) => {
                let mut npc = Entity::new(*key, loc.try_resolve(key, &options.reference_language));
                npc.insert("Archetype", *archetype);
                npc.attributes.extend(stats);
                npcs.insert(key.to_string(), npc);
            }
            Err(e) if options.npc_mode == ParseMode::Lenient => {
                tracing::warn!(key, error = %e, "skipping unparseable NPC");
            }
            Err(e) => return Err(Error::in_entity(key)(e)),
        }
    }

    tracing::debug!(count = npcs.len(), "parsed NPCs");
    Ok(npcs)
}

// ============================================================================
// Field extraction
// ============================================================================

/// Collects named stats from one raw record; missing fields become null.
///
/// Field paths are looked up with engine prefixes stripped at every level
/// (`m_ObjectiveRegen.m_flOutOfCombatHealthRegen` is
/// `ObjectiveRegen.OutOfCombatHealthRegen`).
struct Extractor {
    fields: Value,
    stats: Stats,
}

impl Extractor {
    fn new(raw: &Value) -> Self {
        Self {
            fields: strip_prefixes_deep(raw, FIELD_PREFIXES),
            stats: Stats::new(),
        }
    }

    fn number(mut self, name: &str, path: &[&str]) -> Result<Self> {
        let value = get_number(&self.fields, path)?.map_or(Value::Null, number_value);
        self.stats.insert(name.to_string(), value);
        Ok(self)
    }

    /// Distance field, converted to meters
    fn meters(mut self, name: &str, path: &[&str]) -> Result<Self> {
        let value = units_to_meters(get_number(&self.fields, path)?).map_or(Value::Null, number_value);
        self.stats.insert(name.to_string(), value);
        Ok(self)
    }

    fn finish(self) -> Stats {
        self.stats
    }
}

// ============================================================================
// Archetypes
// ============================================================================

fn parse_trooper(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("DamageToGuardians", &["T1BossDamage"])?
        .number("DamageToTroopers", &["TrooperDamage"])?
        .meters("RunSpeed", &["RunSpeed"])?
        .meters("SightRange", &["SightRangePlayers"])?
        .number("GoldReward", &["GoldReward"])?
        .finish())
}

fn parse_guardian(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("DamageToTroopers", &["TrooperDamage"])?
        .meters("InvulnerabilityRange", &["InvulnRange"])?
        .number(
            "OutOfCombatHealthRegen",
            &["ObjectiveRegen", "OutOfCombatHealthRegen"],
        )?
        .number(
            "OutOfCombatRegenDelay",
            &["ObjectiveRegen", "OutOfCombatRegenDelay"],
        )?
        .finish())
}

fn parse_walker(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("DamageToTroopers", &["TrooperDamage"])?
        .number("StompDamage", &["StompImpact", "Damage"])?
        .meters("StompRadius", &["StompImpact", "Radius"])?
        .number("BulletResist", &["BulletResistModifier", "BulletResist"])?
        .finish())
}

fn parse_patron(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("Phase1Health", &["MaxHealth"])?
        .number("Phase2Health", &["Phase2Health"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("LaserDPS", &["LaserDPSToPlayers"])?
        .number("LaserDPSMaxHealth", &["LaserDPSMaxHealth"])?
        .finish())
}

fn parse_neutral(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("GoldReward", &["GoldReward"])?
        .meters("RunSpeed", &["RunSpeed"])?
        .finish())
}

fn parse_midboss(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("DamageToPlayers", &["PlayerDamage"])?
        .number("HealthRegen", &["HealthRegenPerSecond"])?
        .finish())
}

fn parse_pickup(raw: &Value) -> Result<Stats> {
    Ok(Extractor::new(raw)
        .number("MaxHealth", &["MaxHealth"])?
        .number("GoldReward", &["GoldAmount"])?
        .number("BuffDuration", &["BuffDuration"])?
        .finish())
}

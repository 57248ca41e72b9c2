//! Engine enum literal → label tables
//!
//! These must be extended by hand when a game update introduces a new
//! variant; [`super::map_enum`] refuses anything not listed here.

use phf::phf_map;

/// A named, exhaustive enum lookup table
pub struct EnumTable {
    pub name: &'static str,
    entries: phf::Map<&'static str, &'static str>,
}

impl EnumTable {
    pub fn get(&self, value: &str) -> Option<&'static str> {
        self.entries.get(value).copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub static ABILITY_TYPES: EnumTable = EnumTable {
    name: "ability type",
    entries: phf_map! {
        "EAbilityType_Signature" => "Signature",
        "EAbilityType_Ultimate" => "Ultimate",
        "EAbilityType_Weapon" => "Weapon",
        "EAbilityType_Melee" => "Melee",
        "EAbilityType_Item" => "Item",
        "EAbilityType_Innate" => "Innate",
        "EAbilityType_Internal" => "Internal",
    },
};

/// Item slot → shop category
pub static ITEM_SLOTS: EnumTable = EnumTable {
    name: "item slot",
    entries: phf_map! {
        "EItemSlotType_WeaponMod" => "Weapon",
        "EItemSlotType_Armor" => "Vitality",
        "EItemSlotType_Tech" => "Spirit",
    },
};

pub static ITEM_TIERS: EnumTable = EnumTable {
    name: "item tier",
    entries: phf_map! {
        "EModTier_1" => "1",
        "EModTier_2" => "2",
        "EModTier_3" => "3",
        "EModTier_4" => "4",
    },
};

/// Stat a scaling entry is driven by
pub static SCALING_STATS: EnumTable = EnumTable {
    name: "scaling stat",
    entries: phf_map! {
        "ETechPower" => "Spirit",
        "EWeaponDamageScale" => "WeaponDamage",
        "EMaxHealth" => "Health",
    },
};

pub static UPGRADE_TYPES: EnumTable = EnumTable {
    name: "upgrade type",
    entries: phf_map! {
        "EAddToBase" => "AddToBase",
        "EAddToScale" => "AddToScale",
    },
};

pub static ABILITY_SLOTS: EnumTable = EnumTable {
    name: "ability slot",
    entries: phf_map! {
        "ESlot_Signature_1" => "Signature1",
        "ESlot_Signature_2" => "Signature2",
        "ESlot_Signature_3" => "Signature3",
        "ESlot_Signature_4" => "Signature4",
        "ESlot_Weapon_Primary" => "WeaponPrimary",
        "ESlot_Weapon_Secondary" => "WeaponSecondary",
        "ESlot_Weapon_Melee" => "WeaponMelee",
        "ESlot_Ability_Innate_1" => "Innate1",
        "ESlot_Ability_Innate_2" => "Innate2",
        "ESlot_Ability_Innate_3" => "Innate3",
        "ESlot_Ability_Mantle" => "Mantle",
        "ESlot_Ability_Jump" => "Jump",
        "ESlot_Ability_Slide" => "Slide",
        "ESlot_Ability_ZipLine" => "ZipLine",
        "ESlot_Ability_ZipLineBoost" => "ZipLineBoost",
    },
};

/// Per-level hero upgrades
pub static LEVEL_UP_MODIFIERS: EnumTable = EnumTable {
    name: "level-up modifier",
    entries: phf_map! {
        "MODIFIER_VALUE_BASE_BULLET_DAMAGE_FROM_LEVEL" => "BulletDamage",
        "MODIFIER_VALUE_BASE_MELEE_DAMAGE_FROM_LEVEL" => "MeleeDamage",
        "MODIFIER_VALUE_BASE_HEALTH_FROM_LEVEL" => "MaxHealth",
        "MODIFIER_VALUE_TECH_POWER" => "TechPower",
        "MODIFIER_VALUE_BULLET_ARMOR_DAMAGE_RESIST" => "BulletResist",
        "MODIFIER_VALUE_TECH_ARMOR_DAMAGE_RESIST" => "TechResist",
        "MODIFIER_VALUE_BOON_COUNT" => "BoonCount",
    },
};

//! Small but complete raw data set shared by the unit tests

use serde_json::{json, Value};
use std::path::Path;

use crate::localization::Localizations;
use crate::raw::RawRecords;

fn records(value: Value) -> RawRecords {
    serde_json::from_value(value).expect("fixture is an object")
}

pub fn heroes() -> RawRecords {
    records(json!({
        "hero_base": {
            "m_mapStartingStats": {
                "EMaxMoveSpeed": 7.0,
                "ESprintSpeed": 2.0,
                "ECrouchSpeed": 4.75,
                "EMoveAcceleration": 4.0,
                "ELightMeleeDamage": 50,
                "EHeavyMeleeDamage": 116,
                "EMaxHealth": 550,
                "EBaseHealthRegen": 2.0,
                "EStamina": 3,
                "EStaminaCooldown": 5.0,
                "ECritDamageReceivedScale": 1.0,
                "ETechRange": 1.0,
                "ETechDuration": 1.0,
                "EReloadSpeed": 1.0,
                "ETechPower": 0
            }
        },
        "hero_atlas": {
            "m_bPlayerSelectable": true,
            "m_bDisabled": false,
            "m_mapStartingStats": {
                "EMaxHealth": 650,
                "ELightMeleeDamage": 58,
                "EHeavyMeleeDamage": 116,
                "ECritDamageReceivedScale": 0.85,
                "EReloadSpeed": 1.2
            },
            "m_mapBoundAbilities": {
                "ESlot_Weapon_Primary": "citadel_weapon_atlas",
                "ESlot_Signature_1": "ability_siphon_life",
                "ESlot_Signature_2": "ability_shoulder_charge",
                "ESlot_Signature_3": "ability_unreleased_slot",
                "ESlot_Signature_4": "ability_seismic_impact"
            },
            "m_mapStandardLevelUpUpgrades": {
                "MODIFIER_VALUE_BASE_BULLET_DAMAGE_FROM_LEVEL": 0.3,
                "MODIFIER_VALUE_BASE_MELEE_DAMAGE_FROM_LEVEL": 1.0,
                "MODIFIER_VALUE_BASE_HEALTH_FROM_LEVEL": 40,
                "MODIFIER_VALUE_TECH_POWER": 0
            },
            "m_mapScalingStats": {
                "EMaxMoveSpeed": {"eScalingStat": "ETechPower", "flScale": 0.02},
                "EBaseHealthRegen": {"eScalingStat": "ETechPower", "flScale": 0.0}
            }
        },
        "hero_haze": {
            "m_bPlayerSelectable": true,
            "m_mapStartingStats": {
                "EMaxMoveSpeed": 7.5
            },
            "m_mapBoundAbilities": {
                "ESlot_Weapon_Primary": "citadel_weapon_haze",
                "ESlot_Signature_1": "ability_sleep_dagger"
            },
            "m_mapStandardLevelUpUpgrades": {
                "MODIFIER_VALUE_BASE_BULLET_DAMAGE_FROM_LEVEL": 0.1,
                "MODIFIER_VALUE_BASE_MELEE_DAMAGE_FROM_LEVEL": 2.0,
                "MODIFIER_VALUE_BASE_HEALTH_FROM_LEVEL": 32
            },
            "m_mapScalingStats": {
                "EBulletDamage": {"eScalingStat": "ETechPower", "flScale": 0.05}
            }
        },
        "hero_wip": {
            "m_bPlayerSelectable": false,
            "m_bInDevelopment": "true",
            "m_mapStartingStats": {}
        }
    }))
}

fn flat_spline(y: f64) -> Value {
    json!({
        "m_spline": [
            {"x": 0.0, "y": y, "m_flSlopeIncoming": 0.0, "m_flSlopeOutgoing": 0.0},
            {"x": 100.0, "y": y, "m_flSlopeIncoming": 0.0, "m_flSlopeOutgoing": 0.0}
        ]
    })
}

pub fn abilities() -> RawRecords {
    records(json!({
        "citadel_weapon_atlas": {
            "m_eAbilityType": "EAbilityType_Weapon",
            "m_WeaponInfo": {
                "m_flBulletDamage": 3.6,
                "m_flCycleTime": 0.5,
                "m_iBullets": 9,
                "m_iClipSize": 8,
                "m_reloadDuration": 0.5,
                "m_bReloadSingleBullets": true,
                "m_flReloadSingleBulletsInitialDelay": 0.2,
                "m_BulletSpeedCurve": flat_spline(19685.0),
                "m_flDamageFalloffStartRange": 590.55,
                "m_flDamageFalloffEndRange": 1181.1
            }
        },
        "citadel_weapon_haze": {
            "m_eAbilityType": "EAbilityType_Weapon",
            "m_WeaponInfo": {
                "m_flBulletDamage": 6.0,
                "m_flCycleTime": 0.2,
                "m_iBurstShotCount": 2,
                "m_flIntraBurstCycleTime": 0.05,
                "m_iBullets": 1,
                "m_iClipSize": 24,
                "m_reloadDuration": 2.0,
                "m_bReloadSingleBullets": false,
                "m_BulletSpeedCurve": flat_spline(21000.0)
            }
        },
        "ability_siphon_life": {
            "m_eAbilityType": "EAbilityType_Signature",
            "m_mapAbilityProperties": {
                "AbilityCooldown": {"m_strValue": "43"},
                "AbilityDuration": {"m_strValue": "5.5"},
                "AbilityChannelTime": {"m_strValue": "0"},
                "DamagePerSecond": {
                    "m_strValue": "30",
                    "m_subclassScaleFunction": {
                        "m_eSpecificStatScaleType": "ETechPower",
                        "m_flStatScale": 0.6
                    }
                },
                "Radius": {"m_strValue": "10m"}
            },
            "m_vecAbilityUpgrades": [
                {"m_vecPropertyUpgrades": [
                    {"m_strPropertyName": "AbilityCooldown", "m_strBonus": "-10"}
                ]},
                {"m_vecPropertyUpgrades": [
                    {
                        "m_strPropertyName": "DamagePerSecond",
                        "m_strBonus": "0.4",
                        "m_eUpgradeType": "EAddToScale",
                        "m_eScaleStatFilter": "ETechPower"
                    }
                ]},
                {"m_vecPropertyUpgrades": [
                    {"m_strPropertyName": "AbilityDuration", "m_strBonus": "3", "m_eUpgradeType": "EAddToBase"}
                ]}
            ]
        },
        "ability_shoulder_charge": {
            "m_eAbilityType": "EAbilityType_Signature",
            "m_mapAbilityProperties": {
                "AbilityCooldown": {"m_strValue": "35"},
                "StunDuration": {"m_strValue": "0.75"}
            }
        },
        "ability_seismic_impact": {
            "m_eAbilityType": "EAbilityType_Ultimate",
            "m_mapAbilityProperties": {
                "AbilityCooldown": {"m_strValue": "155"},
                "Damage": {"m_strValue": "150"}
            }
        },
        "ability_sleep_dagger": {
            "m_eAbilityType": "EAbilityType_Signature",
            "m_mapAbilityProperties": {
                "AbilityCooldown": {"m_strValue": "30"}
            }
        },
        "ability_climb_rope": {
            "m_eAbilityType": "EAbilityType_Innate",
            "m_mapAbilityProperties": {}
        },
        "upgrade_headshot_booster": {
            "m_eAbilityType": "EAbilityType_Item",
            "m_eItemSlotType": "EItemSlotType_WeaponMod",
            "m_iItemTier": "EModTier_1",
            "m_bDisabled": false,
            "m_mapAbilityProperties": {
                "AbilityCooldown": {"m_strValue": "7.5"},
                "HeadShotBonusDamage": {"m_strValue": "40"},
                "AbilityCastRange": {"m_strValue": "0"}
            }
        },
        "upgrade_extra_regen": {
            "m_eAbilityType": "EAbilityType_Item",
            "m_eItemSlotType": "EItemSlotType_Armor",
            "m_iItemTier": "EModTier_2",
            "m_bDisabled": "false",
            "m_mapAbilityProperties": {
                "BonusHealthRegen": {"m_strValue": "3"}
            }
        },
        "upgrade_superior_regen": {
            "m_eAbilityType": "EAbilityType_Item",
            "m_eItemSlotType": "EItemSlotType_Armor",
            "m_iItemTier": "EModTier_3",
            "m_vecComponentItems": ["upgrade_extra_regen"],
            "m_mapAbilityProperties": {
                "BonusHealthRegen": {"m_strValue": "6"}
            }
        },
        "upgrade_old_relic": {
            "m_eAbilityType": "EAbilityType_Item",
            "m_eItemSlotType": "EItemSlotType_Tech",
            "m_iItemTier": "EModTier_4",
            "m_bDisabled": "true",
            "m_mapAbilityProperties": {}
        }
    }))
}

pub fn generic_data() -> Value {
    json!({
        "m_nItemPricePerTier": [0, 500, 1200, 3200, 6200]
    })
}

pub fn npc_units() -> RawRecords {
    records(json!({
        "trooper_normal": {
            "m_nMaxHealth": 220,
            "m_flPlayerDamage": "16",
            "m_flT1BossDamage": 40,
            "m_flTrooperDamage": 30,
            "m_flRunSpeed": 236.22,
            "m_flSightRangePlayers": 1181.1,
            "m_flGoldReward": 52
        },
        "npc_boss_tier1": {
            "m_nMaxHealth": 6500,
            "m_flPlayerDamage": 100,
            "m_flTrooperDamage": 120,
            "m_flInvulnRange": 984.25,
            "m_ObjectiveRegen": {
                "m_flOutOfCombatHealthRegen": 250,
                "m_flOutOfCombatRegenDelay": 6.0
            }
        },
        "npc_boss_tier2": {
            "m_nMaxHealth": 9000,
            "m_flPlayerDamage": 150,
            "m_StompImpact": {"m_flDamage": 200, "m_flRadius": 393.7}
        },
        "neutral_trooper_weak": {
            "m_nMaxHealth": 150,
            "m_flPlayerDamage": 10,
            "m_flGoldReward": 35
        },
        "npc_super_neutral": {
            "m_nMaxHealth": 14000,
            "m_flPlayerDamage": 90,
            "m_flHealthRegenPerSecond": 50
        },
        "npc_test_dummy": {
            "m_nMaxHealth": 1
        }
    }))
}

/// `(language, group, entries)` of every fixture localization file
pub const LOCALIZATION_GROUPS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "english",
        "citadel_gc",
        &[
            ("Language", "english"),
            ("StatDesc_Spirit", "Spirit"),
            ("StatDesc_Range", "Range"),
            ("StatDesc_Duration", "Duration"),
            ("Regen_Line", "Regenerates {s:BonusHealthRegen} HP/s"),
            ("trooper_normal", "Trooper"),
            ("npc_boss_tier1", "Guardian"),
            ("npc_boss_tier2", "Walker"),
            ("npc_super_neutral", "Mid-Boss"),
        ],
    ),
    (
        "english",
        "citadel_heroes",
        &[
            ("Language", "english"),
            ("hero_atlas", "Abrams"),
            ("hero_haze", "Haze"),
            ("citadel_weapon_atlas", "Abrams' Shotgun"),
            ("citadel_weapon_haze", "Haze's SMG"),
            ("ability_siphon_life", "Siphon Life"),
            ("ability_siphon_life_desc", "Drains {s:DamagePerSecond} health per second for {s:AbilityDuration}s."),
            ("ability_shoulder_charge", "Shoulder Charge"),
            ("ability_seismic_impact", "Seismic Impact"),
            ("ability_sleep_dagger", "Sleep Dagger"),
        ],
    ),
    (
        "english",
        "citadel_mods",
        &[
            ("Language", "english"),
            ("upgrade_headshot_booster", "Headshot Booster"),
            ("upgrade_headshot_booster_desc", "Headshots deal {s:HeadShotBonusDamage} bonus damage every {s:AbilityCooldown}s."),
            ("upgrade_extra_regen", "Extra Regen"),
            ("upgrade_extra_regen_desc", "{s:Regen_Line}."),
            ("upgrade_superior_regen", "Superior Regen"),
            ("upgrade_old_relic", "Old Relic"),
        ],
    ),
    (
        "spanish",
        "citadel_heroes",
        &[("Language", "spanish"), ("hero_atlas", "Abrams ES")],
    ),
];

pub fn localizations() -> Localizations {
    let mut loc = Localizations::new();
    for (language, group, entries) in LOCALIZATION_GROUPS {
        loc.merge(language, group, entries.iter().copied())
            .expect("fixture localizations are consistent");
    }
    loc
}

/// Changelogs of the fixture data directory, `(file name, content)`
pub const CHANGELOGS: &[(&str, &str)] = &[
    (
        "2024-05-01.txt",
        "[ Hero Gameplay Changes ]\n\
         - Abrams: Siphon Life damage increased from 30 -> 35\n\
         - Haze: Sleep Dagger cooldown reduced\n\
         [ Item Changes ]\n\
         - Extra Regen now also affects Old Relic\n\
         - Urn delivery reward increased\n",
    ),
    (
        "2024-05-20.html",
        "<p><b>[ General Changes ]</b></p>\
         <ul><li>Matchmaking improvements</li>\
         <li>Return Fire no longer triggers Headshot Booster</li></ul>",
    ),
];

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("create fixture dir");
    std::fs::write(path, serde_json::to_string_pretty(value).expect("serialize fixture")).expect("write fixture");
}

/// Lay the fixture data out the way the decompiler does
pub fn write_data_dir(dir: &Path) {
    let scripts = dir.join("scripts");
    write_json(&scripts.join("heroes.json"), &json!(heroes()));
    write_json(&scripts.join("abilities.json"), &json!(abilities()));
    write_json(&scripts.join("generic_data.json"), &generic_data());
    write_json(&scripts.join("npc_units.json"), &json!(npc_units()));

    for (language, group, entries) in LOCALIZATION_GROUPS {
        let table: serde_json::Map<String, Value> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect();
        let path = dir
            .join("localizations")
            .join(group)
            .join(format!("{group}_{language}.json"));
        write_json(&path, &Value::Object(table));
    }

    let raw = dir.join("changelogs").join("raw");
    std::fs::create_dir_all(&raw).expect("create changelog dir");
    for (name, content) in CHANGELOGS {
        std::fs::write(raw.join(name), content).expect("write changelog");
    }
}

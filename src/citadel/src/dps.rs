//! Weapon damage and scaling calculations
//!
//! Pure functions over [`WeaponStats`]. Burst DPS assumes uninterrupted fire;
//! sustained DPS amortizes one full clip over the fire-and-reload cycle.

use serde::Deserialize;
use thiserror::Error;

use crate::entity::ScalingMap;

#[derive(Error, Debug, PartialEq)]
pub enum CalcError {
    #[error("Curve is not linear: point {index} has slopes ({incoming}, {outgoing})")]
    NonLinearCurve {
        index: usize,
        incoming: f64,
        outgoing: f64,
    },

    #[error("Curve is not constant: point {index} has value {value}, expected {expected}")]
    NonConstantCurve {
        index: usize,
        value: f64,
        expected: f64,
    },

    #[error("Curve has no points")]
    EmptyCurve,
}

/// Inputs to the DPS formulas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeaponStats {
    pub bullet_damage: f64,
    pub rounds_per_second: f64,
    pub bullets_per_shot: f64,
    pub clip_size: f64,
    pub reload_time: f64,
    pub reload_single: bool,
    pub reload_delay: f64,
}

/// Which DPS formula to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpsKind {
    Burst,
    Sustained,
}

impl DpsKind {
    /// Output attribute name
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Burst => "BurstDPS",
            Self::Sustained => "SustainedDPS",
        }
    }
}

impl WeaponStats {
    /// Copy of these stats with every scaled stat incremented by its delta.
    ///
    /// Scaling keys that are not weapon stats are ignored.
    pub fn scaled(&self, scaling: &ScalingMap) -> Self {
        let delta = |name: &str| scaling.get(name).copied().unwrap_or(0.0);
        Self {
            bullet_damage: self.bullet_damage + delta("BulletDamage"),
            rounds_per_second: self.rounds_per_second + delta("RoundsPerSecond"),
            bullets_per_shot: self.bullets_per_shot + delta("BulletsPerShot"),
            clip_size: self.clip_size + delta("ClipSize"),
            reload_time: self.reload_time + delta("ReloadTime"),
            reload_single: self.reload_single,
            reload_delay: self.reload_delay + delta("ReloadDelay"),
        }
    }

    pub fn dps(&self, kind: DpsKind) -> f64 {
        match kind {
            DpsKind::Burst => burst_dps(self),
            DpsKind::Sustained => sustained_dps(self),
        }
    }
}

/// Damage per second if the weapon never had to reload
pub fn burst_dps(w: &WeaponStats) -> f64 {
    w.bullet_damage * w.rounds_per_second * w.bullets_per_shot
}

/// Damage per second over one clip plus its reload.
///
/// Weapons without a magazine (clip size ≤ 0) never reload, so this is
/// exactly [`burst_dps`] for them.
pub fn sustained_dps(w: &WeaponStats) -> f64 {
    if w.clip_size <= 0.0 {
        return burst_dps(w);
    }

    let clip_damage = w.bullet_damage * w.bullets_per_shot * w.clip_size;
    let time_to_empty = w.clip_size / w.rounds_per_second;
    let reload = if w.reload_single {
        w.reload_time * w.clip_size
    } else {
        w.reload_time
    };
    let cycle = time_to_empty + reload + w.reload_delay;
    if cycle <= 0.0 {
        return burst_dps(w);
    }
    clip_damage / cycle
}

/// Change in DPS from one unit of scaling.
///
/// Recomputes DPS with all scaled stats incremented together, so cross terms
/// (damage and fire rate both scaling) are included.
pub fn scaled_dps_delta(w: &WeaponStats, scaling: &ScalingMap, kind: DpsKind) -> f64 {
    w.scaled(scaling).dps(kind) - w.dps(kind)
}

/// One control point of an engine curve
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurvePoint {
    #[serde(default)]
    pub x: f64,
    pub y: f64,
    #[serde(rename = "m_flSlopeIncoming", default)]
    pub slope_incoming: f64,
    #[serde(rename = "m_flSlopeOutgoing", default)]
    pub slope_outgoing: f64,
}

/// Bullet velocity from a speed curve.
///
/// Only flat curves are supported: every slope must be zero and every value
/// equal. Anything else is an error rather than an approximation.
pub fn bullet_velocity(curve: &[CurvePoint]) -> Result<f64, CalcError> {
    let first = curve.first().ok_or(CalcError::EmptyCurve)?;

    for (index, point) in curve.iter().enumerate() {
        if point.slope_incoming != 0.0 || point.slope_outgoing != 0.0 {
            return Err(CalcError::NonLinearCurve {
                index,
                incoming: point.slope_incoming,
                outgoing: point.slope_outgoing,
            });
        }
        if point.y != first.y {
            return Err(CalcError::NonConstantCurve {
                index,
                value: point.y,
                expected: first.y,
            });
        }
    }

    Ok(first.y)
}

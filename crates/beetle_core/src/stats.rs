//! Stat resolver.
//!
//! Pure functions mapping base stats, upgrade counters and level to
//! effective stats and caps. Each upgrade adds 10% of the base value and
//! each level raises the cap by 10% of the base value, so an upgrade is
//! allowed exactly while the stat's counter is below the agent's level.
//!
//! The same functions serve the upgrade shop preview and the frozen stat
//! snapshot taken when an agent spawns.

use serde::{Deserialize, Serialize};

use crate::catalog::BaseStats;
use crate::math::{fixed_serde, Fixed};

/// One of the five upgradable stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Maximum health.
    Health,
    /// Attack.
    Attack,
    /// Defense.
    Defense,
    /// Carry capacity.
    Carry,
    /// Movement speed.
    Speed,
}

impl StatKind {
    /// All stat kinds in display order.
    pub const ALL: [Self; 5] = [
        Self::Health,
        Self::Attack,
        Self::Defense,
        Self::Carry,
        Self::Speed,
    ];

    /// Base value of this stat in `base`.
    #[must_use]
    pub fn base_value(self, base: &BaseStats) -> Fixed {
        match self {
            Self::Health => base.health,
            Self::Attack => base.attack,
            Self::Defense => base.defense,
            Self::Carry => base.carry,
            Self::Speed => base.speed,
        }
    }
}

/// `base * (1 + upgrades * 0.1)`.
#[must_use]
pub fn effective_stat(base: Fixed, upgrades: u32) -> Fixed {
    scale_by_tenths(base, upgrades)
}

/// `base * (1 + level * 0.1)`.
#[must_use]
pub fn stat_cap(base: Fixed, level: u32) -> Fixed {
    scale_by_tenths(base, level)
}

/// Whether one more upgrade is allowed at this level.
#[must_use]
pub fn can_upgrade(base: Fixed, upgrades: u32, level: u32) -> bool {
    effective_stat(base, upgrades) < stat_cap(base, level)
}

fn scale_by_tenths(base: Fixed, tenths: u32) -> Fixed {
    let factor = Fixed::from_num(10u32.saturating_add(tenths));
    base.saturating_mul(factor) / Fixed::from_num(10)
}

/// Per-stat upgrade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeCounters {
    /// Health upgrades.
    pub health: u32,
    /// Attack upgrades.
    pub attack: u32,
    /// Defense upgrades.
    pub defense: u32,
    /// Carry upgrades.
    pub carry: u32,
    /// Speed upgrades.
    pub speed: u32,
}

impl UpgradeCounters {
    /// Counter for a stat.
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Health => self.health,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Carry => self.carry,
            StatKind::Speed => self.speed,
        }
    }

    fn get_mut(&mut self, stat: StatKind) -> &mut u32 {
        match stat {
            StatKind::Health => &mut self.health,
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Carry => &mut self.carry,
            StatKind::Speed => &mut self.speed,
        }
    }
}

/// Persistent growth record of one owned agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeRecord {
    /// Agent level, starting at 1.
    pub level: u32,
    /// Upgrade counters.
    pub upgrades: UpgradeCounters,
}

impl Default for UpgradeRecord {
    fn default() -> Self {
        Self {
            level: 1,
            upgrades: UpgradeCounters::default(),
        }
    }
}

impl UpgradeRecord {
    /// Whether `stat` can be upgraded once more.
    #[must_use]
    pub fn can_upgrade(&self, base: &BaseStats, stat: StatKind) -> bool {
        can_upgrade(stat.base_value(base), self.upgrades.get(stat), self.level)
    }

    /// Increment `stat` by one if the cap allows it.
    ///
    /// Returns `false` and leaves the record untouched at the cap.
    pub fn try_upgrade(&mut self, base: &BaseStats, stat: StatKind) -> bool {
        if !self.can_upgrade(base, stat) {
            return false;
        }
        *self.upgrades.get_mut(stat) += 1;
        true
    }

    /// Effective value of `stat`.
    #[must_use]
    pub fn effective(&self, base: &BaseStats, stat: StatKind) -> Fixed {
        effective_stat(stat.base_value(base), self.upgrades.get(stat))
    }

    /// Cap of `stat` at the current level.
    #[must_use]
    pub fn cap(&self, base: &BaseStats, stat: StatKind) -> Fixed {
        stat_cap(stat.base_value(base), self.level)
    }

    /// Snapshot of every effective stat.
    #[must_use]
    pub fn resolve(&self, base: &BaseStats) -> EffectiveStats {
        EffectiveStats {
            health: self.effective(base, StatKind::Health),
            attack: self.effective(base, StatKind::Attack),
            defense: self.effective(base, StatKind::Defense),
            carry: self.effective(base, StatKind::Carry),
            speed: self.effective(base, StatKind::Speed),
        }
    }
}

/// Effective stats of an agent, computed once and frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Maximum health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Attack.
    #[serde(with = "fixed_serde")]
    pub attack: Fixed,
    /// Defense.
    #[serde(with = "fixed_serde")]
    pub defense: Fixed,
    /// Carry capacity.
    #[serde(with = "fixed_serde")]
    pub carry: Fixed,
    /// Speed.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
}

impl From<BaseStats> for EffectiveStats {
    fn from(base: BaseStats) -> Self {
        Self {
            health: base.health,
            attack: base.attack,
            defense: base.defense,
            carry: base.carry,
            speed: base.speed,
        }
    }
}

impl EffectiveStats {
    /// Boost health, attack and defense by a flat percentage.
    ///
    /// Carry and speed are untouched. Boosted values are rounded to whole
    /// numbers.
    #[must_use]
    pub fn with_bonus(self, percent: u32) -> Self {
        let factor = Fixed::from_num(100u32.saturating_add(percent)) / Fixed::from_num(100);
        let boost = |v: Fixed| v.saturating_mul(factor).round();
        Self {
            health: boost(self.health),
            attack: boost(self.attack),
            defense: boost(self.defense),
            ..self
        }
    }

    /// Round health, attack, defense and carry to whole numbers.
    ///
    /// Speed keeps its fraction.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            health: self.health.round(),
            attack: self.attack.round(),
            defense: self.defense.round(),
            carry: self.carry.round(),
            speed: self.speed,
        }
    }
}

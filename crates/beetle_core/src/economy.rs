//! Economy formulas and balances.
//!
//! Pure, stateless formulas for deck cost caps, expansion prices, level-up
//! costs, luck levels and multipliers, plus the difficulty table and match
//! rewards. Balances live in [`Wallet`], whose spends either succeed in full
//! or leave it untouched.
//!
//! Currency amounts are integers. Multipliers are fixed-point.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::math::{ratio, Fixed};
use crate::stats::StatKind;

/// Highest luck level.
pub const MAX_LUCK_LEVEL: u32 = 20;

/// SG cost to reach the next luck level, indexed by the current level.
const LUCK_LEVEL_COSTS: [u64; MAX_LUCK_LEVEL as usize] = [
    0, 5_000, 6_000, 7_000, 8_000, 9_000, 10_000, 11_000, 12_000, 13_000, 14_000, 15_000, 10_000,
    10_000, 20_000, 20_000, 30_000, 50_000, 50_000, 100_000,
];

/// Base luck multiplier per level in hundredths, index 0 is level 1.
const LUCK_BASE_MULTIPLIERS: [u32; MAX_LUCK_LEVEL as usize] = [
    100, 110, 120, 130, 140, 150, 160, 170, 180, 200, 210, 220, 230, 240, 250, 260, 270, 280, 290,
    300,
];

/// SG and LUP balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Soft currency.
    pub sg: u64,
    /// Level-up points.
    pub lup: u64,
}

impl Wallet {
    /// Create a wallet.
    #[must_use]
    pub const fn new(sg: u64, lup: u64) -> Self {
        Self { sg, lup }
    }

    /// Whether `cost` SG is affordable.
    #[must_use]
    pub const fn can_afford_sg(&self, cost: u64) -> bool {
        self.sg >= cost
    }

    /// Spend SG if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn spend_sg(&mut self, cost: u64) -> bool {
        if self.sg >= cost {
            self.sg -= cost;
            true
        } else {
            false
        }
    }

    /// Spend LUP if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn spend_lup(&mut self, cost: u64) -> bool {
        if self.lup >= cost {
            self.lup -= cost;
            true
        } else {
            false
        }
    }

    /// Add SG.
    pub fn add_sg(&mut self, amount: u64) {
        self.sg = self.sg.saturating_add(amount);
    }

    /// Add LUP.
    pub fn add_lup(&mut self, amount: u64) {
        self.lup = self.lup.saturating_add(amount);
    }
}

/// Deck, upgrade and level-up pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Deck cost cap with no expansions.
    pub initial_deck_cost: u32,
    /// Cap added per expansion.
    pub deck_cost_per_expansion: u32,
    /// Maximum number of expansions.
    pub max_expansions: u32,
    /// Price of the first expansion; doubles each time.
    pub expansion_base_price: u64,
    /// Level-up cost added per current level.
    pub level_up_per_level: u64,
    /// Level-up cost at level zero.
    pub level_up_base: u64,
    /// SG cost of one health upgrade.
    pub health_upgrade_cost: u64,
    /// SG cost of one attack upgrade.
    pub attack_upgrade_cost: u64,
    /// SG cost of one defense upgrade.
    pub defense_upgrade_cost: u64,
    /// SG cost of one carry upgrade.
    pub carry_upgrade_cost: u64,
    /// SG cost of one speed upgrade.
    pub speed_upgrade_cost: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_deck_cost: 240,
            deck_cost_per_expansion: 10,
            max_expansions: 20,
            expansion_base_price: 50_000,
            level_up_per_level: 50,
            level_up_base: 300,
            health_upgrade_cost: 10,
            attack_upgrade_cost: 20,
            defense_upgrade_cost: 20,
            carry_upgrade_cost: 30,
            speed_upgrade_cost: 20,
        }
    }
}

impl EconomyConfig {
    /// `initial + expansions * per_expansion`.
    #[must_use]
    pub fn deck_cost_cap(&self, expansions: u32) -> u32 {
        self.initial_deck_cost
            .saturating_add(expansions.saturating_mul(self.deck_cost_per_expansion))
    }

    /// `base_price * 2^expansions`.
    #[must_use]
    pub fn expansion_price(&self, expansions: u32) -> u64 {
        let factor = 1u64.checked_shl(expansions).unwrap_or(u64::MAX);
        self.expansion_base_price.saturating_mul(factor)
    }

    /// `level * per_level + base`, in LUP.
    #[must_use]
    pub fn level_up_cost(&self, level: u32) -> u64 {
        u64::from(level)
            .saturating_mul(self.level_up_per_level)
            .saturating_add(self.level_up_base)
    }

    /// SG cost of one upgrade of `stat`.
    #[must_use]
    pub const fn upgrade_cost(&self, stat: StatKind) -> u64 {
        match stat {
            StatKind::Health => self.health_upgrade_cost,
            StatKind::Attack => self.attack_upgrade_cost,
            StatKind::Defense => self.defense_upgrade_cost,
            StatKind::Carry => self.carry_upgrade_cost,
            StatKind::Speed => self.speed_upgrade_cost,
        }
    }
}

/// SG cost to go from `level` to `level + 1`; `None` at the maximum.
#[must_use]
pub fn luck_level_cost(level: u32) -> Option<u64> {
    if level == 0 || level >= MAX_LUCK_LEVEL {
        return None;
    }
    LUCK_LEVEL_COSTS.get(level as usize).copied()
}

/// Total SG to climb from level 1 to `target`.
#[must_use]
pub fn total_luck_cost(target: u32) -> u64 {
    (1..target.min(MAX_LUCK_LEVEL))
        .filter_map(luck_level_cost)
        .sum()
}

/// Base luck multiplier at `level` in hundredths, or `None` outside `1..=20`.
#[must_use]
pub fn luck_base_multiplier(level: u32) -> Option<u32> {
    level
        .checked_sub(1)
        .and_then(|i| LUCK_BASE_MULTIPLIERS.get(i as usize))
        .copied()
}

/// Per-player luck: level plus a 100-point split between pull quality and
/// growth speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LuckProfileData")]
pub struct LuckProfile {
    level: u32,
    gacha_points: u32,
    growth_points: u32,
}

#[derive(Deserialize)]
struct LuckProfileData {
    level: u32,
    gacha_points: u32,
    growth_points: u32,
}

impl TryFrom<LuckProfileData> for LuckProfile {
    type Error = GameError;

    fn try_from(data: LuckProfileData) -> Result<Self, Self::Error> {
        Self::try_new(data.level, data.gacha_points, data.growth_points)
    }
}

impl Default for LuckProfile {
    fn default() -> Self {
        Self {
            level: 1,
            gacha_points: 50,
            growth_points: 50,
        }
    }
}

impl LuckProfile {
    /// Create a luck profile.
    ///
    /// # Panics
    ///
    /// Panics if `level` is outside `1..=20` or the points do not sum to 100.
    #[must_use]
    pub fn new(level: u32, gacha_points: u32, growth_points: u32) -> Self {
        match Self::try_new(level, gacha_points, growth_points) {
            Ok(luck) => luck,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a luck profile, rejecting an out-of-range level or a split
    /// that does not sum to 100.
    pub fn try_new(
        level: u32,
        gacha_points: u32,
        growth_points: u32,
    ) -> Result<Self, GameError> {
        if !(1..=MAX_LUCK_LEVEL).contains(&level) {
            return Err(GameError::InvalidConfig(format!(
                "luck level {level} outside 1..={MAX_LUCK_LEVEL}"
            )));
        }
        if gacha_points.checked_add(growth_points) != Some(100) {
            return Err(GameError::InvalidConfig(format!(
                "luck points must sum to 100, got {gacha_points} + {growth_points}"
            )));
        }
        Ok(Self {
            level,
            gacha_points,
            growth_points,
        })
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Points allocated to pull quality.
    #[must_use]
    pub const fn gacha_points(&self) -> u32 {
        self.gacha_points
    }

    /// Points allocated to growth speed.
    #[must_use]
    pub const fn growth_points(&self) -> u32 {
        self.growth_points
    }

    /// Re-split the points. Returns `false` unless they sum to 100.
    pub fn distribute(&mut self, gacha_points: u32, growth_points: u32) -> bool {
        if gacha_points.checked_add(growth_points) != Some(100) {
            return false;
        }
        self.gacha_points = gacha_points;
        self.growth_points = growth_points;
        true
    }

    /// Raise the level by one if not at the maximum.
    pub(crate) fn advance_level(&mut self) -> bool {
        if self.level >= MAX_LUCK_LEVEL {
            return false;
        }
        self.level += 1;
        true
    }

    /// Both multipliers for this profile.
    #[must_use]
    pub fn multipliers(&self) -> LuckMultipliers {
        LuckMultipliers {
            gacha: to_multiplier(self.scaled_multiplier(self.gacha_points)),
            growth: to_multiplier(self.scaled_multiplier(self.growth_points)),
        }
    }

    /// Growth multiplier in ten-thousandths, for exact integer scaling.
    #[must_use]
    pub fn growth_ten_thousandths(&self) -> u64 {
        self.scaled_multiplier(self.growth_points)
    }

    fn scaled_multiplier(&self, points: u32) -> u64 {
        let base = luck_base_multiplier(self.level).unwrap_or(100);
        luck_multiplier_ten_thousandths(base, points)
    }
}

/// `1 + (base - 1) * points / 100` in ten-thousandths, with `base` in
/// hundredths.
#[must_use]
pub fn luck_multiplier_ten_thousandths(base_hundredths: u32, points: u32) -> u64 {
    10_000 + u64::from(base_hundredths.saturating_sub(100)) * u64::from(points)
}

/// `1 + (base - 1) * points / 100`, with `base` in hundredths.
#[must_use]
pub fn luck_multiplier(base_hundredths: u32, points: u32) -> Fixed {
    to_multiplier(luck_multiplier_ten_thousandths(base_hundredths, points))
}

fn to_multiplier(ten_thousandths: u64) -> Fixed {
    Fixed::from_num(ten_thousandths) / Fixed::from_num(10_000)
}

/// Multipliers derived from a [`LuckProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuckMultipliers {
    /// Applied to gacha odds.
    pub gacha: Fixed,
    /// Applied to LUP rewards.
    pub growth: Fixed,
}

/// Result of a match from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    /// Player won.
    Win,
    /// Tie at time-out.
    Draw,
    /// CPU won.
    Lose,
}

/// One difficulty setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyMode {
    /// 1-based id.
    pub id: u32,
    /// Display name.
    pub name: &'static str,
    /// Percentage boost to CPU health, attack and defense.
    pub cpu_bonus_percent: u32,
    /// SG for a win.
    pub win_reward: u64,
    /// SG for a draw.
    pub draw_reward: u64,
    /// SG for a loss.
    pub lose_reward: u64,
    /// LUP multiplier in tenths.
    pub lup_multiplier_tenths: u32,
}

const fn mode(
    id: u32,
    name: &'static str,
    cpu_bonus_percent: u32,
    rewards: [u64; 3],
    lup_multiplier_tenths: u32,
) -> DifficultyMode {
    DifficultyMode {
        id,
        name,
        cpu_bonus_percent,
        win_reward: rewards[0],
        draw_reward: rewards[1],
        lose_reward: rewards[2],
        lup_multiplier_tenths,
    }
}

/// The twelve difficulty modes, easiest first.
pub const DIFFICULTY_MODES: [DifficultyMode; 12] = [
    mode(1, "Beginner", 0, [20, 10, 3], 10),
    mode(2, "Beginner+", 15, [25, 12, 4], 12),
    mode(3, "Intermediate", 35, [30, 15, 4], 15),
    mode(4, "Intermediate+", 55, [40, 20, 4], 18),
    mode(5, "Advanced", 80, [50, 25, 5], 20),
    mode(6, "Advanced+", 110, [60, 30, 5], 25),
    mode(7, "Demon", 150, [80, 40, 5], 30),
    mode(8, "Demon+", 210, [100, 50, 5], 40),
    mode(9, "Devil", 280, [150, 70, 5], 50),
    mode(10, "Hell", 350, [200, 90, 5], 70),
    mode(11, "White Dwarf", 450, [400, 170, 5], 100),
    mode(12, "Black Hole", 700, [700, 250, 5], 150),
];

impl DifficultyMode {
    /// Mode by id; unknown ids fall back to the easiest mode.
    #[must_use]
    pub fn by_id(id: u32) -> &'static Self {
        DIFFICULTY_MODES
            .iter()
            .find(|m| m.id == id)
            .unwrap_or(&DIFFICULTY_MODES[0])
    }

    /// SG reward for a result.
    #[must_use]
    pub const fn sg_reward(&self, result: MatchResult) -> u64 {
        match result {
            MatchResult::Win => self.win_reward,
            MatchResult::Draw => self.draw_reward,
            MatchResult::Lose => self.lose_reward,
        }
    }

    /// LUP multiplier.
    #[must_use]
    pub fn lup_multiplier(&self) -> Fixed {
        ratio(self.lup_multiplier_tenths as i32, 10)
    }
}

/// LUP per nectar delivered.
pub const LUP_PER_NECTAR: u32 = 1;
/// LUP per enemy defeated.
pub const LUP_PER_DEFEAT: u32 = 5;

/// Rewards granted at the end of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRewards {
    /// Result the rewards were computed for.
    pub result: MatchResult,
    /// SG granted.
    pub sg: u64,
    /// LUP granted.
    pub lup: u64,
}

impl MatchRewards {
    /// Compute rewards for the player's side of a finished match.
    ///
    /// LUP is shared out per player agent (each share floored), summed,
    /// then scaled by the difficulty's multiplier and the luck profile's
    /// growth multiplier and floored again.
    #[must_use]
    pub fn compute(
        mode: &DifficultyMode,
        result: MatchResult,
        nectar_delivered: u32,
        enemies_defeated: u32,
        player_agents: u32,
        luck: &LuckProfile,
    ) -> Self {
        let sg = mode.sg_reward(result);
        if player_agents == 0 {
            return Self { result, sg, lup: 0 };
        }

        let per_agent = nectar_delivered.saturating_mul(LUP_PER_NECTAR) / player_agents
            + enemies_defeated.saturating_mul(LUP_PER_DEFEAT) / player_agents;
        let raw = u64::from(per_agent) * u64::from(player_agents);
        let lup = raw
            .saturating_mul(u64::from(mode.lup_multiplier_tenths))
            .saturating_mul(luck.growth_ten_thousandths())
            / 100_000;

        Self { result, sg, lup }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_spend() {
        let mut wallet = Wallet::new(100, 0);
        assert!(wallet.spend_sg(60));
        assert!(!wallet.spend_sg(60));
        assert_eq!(wallet.sg, 40);
        assert!(!wallet.spend_lup(1));
    }

    #[test]
    fn test_deck_cost_cap() {
        let config = EconomyConfig::default();
        assert_eq!(config.deck_cost_cap(0), 240);
        assert_eq!(config.deck_cost_cap(3), 270);
    }

    #[test]
    fn test_expansion_price_doubles() {
        let config = EconomyConfig::default();
        assert_eq!(config.expansion_price(0), 50_000);
        assert_eq!(config.expansion_price(1), 100_000);
        assert_eq!(config.expansion_price(4), 800_000);
    }

    #[test]
    fn test_level_up_cost() {
        let config = EconomyConfig::default();
        assert_eq!(config.level_up_cost(1), 350);
        assert_eq!(config.level_up_cost(10), 800);
    }

    #[test]
    fn test_upgrade_costs() {
        let config = EconomyConfig::default();
        assert_eq!(config.upgrade_cost(StatKind::Health), 10);
        assert_eq!(config.upgrade_cost(StatKind::Carry), 30);
    }

    #[test]
    fn test_luck_level_costs() {
        assert_eq!(luck_level_cost(1), Some(5_000));
        assert_eq!(luck_level_cost(19), Some(100_000));
        assert_eq!(luck_level_cost(20), None);
        assert_eq!(luck_level_cost(0), None);
        assert_eq!(total_luck_cost(1), 0);
        assert_eq!(total_luck_cost(3), 11_000);
    }

    #[test]
    fn test_luck_multipliers_level_ten() {
        let luck = LuckProfile::new(10, 100, 0);
        let m = luck.multipliers();
        assert_eq!(m.gacha, Fixed::from_num(2));
        assert_eq!(m.growth, Fixed::from_num(1));
    }

    #[test]
    fn test_default_luck_is_neutral() {
        let m = LuckProfile::default().multipliers();
        assert_eq!(m.gacha, Fixed::from_num(1));
        assert_eq!(m.growth, Fixed::from_num(1));
    }

    #[test]
    fn test_distribute_requires_hundred() {
        let mut luck = LuckProfile::default();
        assert!(!luck.distribute(70, 20));
        assert_eq!(luck.gacha_points(), 50);
        assert!(luck.distribute(70, 30));
        assert_eq!(luck.growth_points(), 30);
    }

    #[test]
    #[should_panic(expected = "must sum to 100")]
    fn test_bad_luck_points_panic() {
        let _ = LuckProfile::new(1, 60, 60);
    }

    #[test]
    fn test_deserialized_luck_is_checked() {
        let bytes = bincode::serialize(&LuckProfile::new(4, 30, 70)).unwrap();
        let restored: LuckProfile = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, LuckProfile::new(4, 30, 70));

        let uneven = ron::from_str::<LuckProfile>("(level: 3, gacha_points: 60, growth_points: 60)");
        assert!(uneven.is_err());
        let too_high = ron::from_str::<LuckProfile>("(level: 21, gacha_points: 50, growth_points: 50)");
        assert!(too_high.is_err());
    }

    #[test]
    fn test_difficulty_lookup() {
        assert_eq!(DifficultyMode::by_id(5).cpu_bonus_percent, 80);
        assert_eq!(DifficultyMode::by_id(99).id, 1);
        assert_eq!(DifficultyMode::by_id(12).sg_reward(MatchResult::Draw), 250);
    }

    #[test]
    fn test_rewards_floor_per_agent() {
        let mode = DifficultyMode::by_id(1);
        // 10 nectar over 3 agents -> 3 each; 1 defeat -> 5/3 = 1 each
        let rewards =
            MatchRewards::compute(mode, MatchResult::Win, 10, 1, 3, &LuckProfile::default());
        assert_eq!(rewards.sg, 20);
        assert_eq!(rewards.lup, 12);
    }

    #[test]
    fn test_rewards_scale_with_difficulty_and_growth() {
        let mode = DifficultyMode::by_id(2);
        let luck = LuckProfile::new(10, 50, 50);
        let rewards = MatchRewards::compute(mode, MatchResult::Lose, 10, 0, 1, &luck);
        // 10 * 1.2 * 1.5 = 18
        assert_eq!(rewards.lup, 18);
        assert_eq!(rewards.sg, 4);
    }
}

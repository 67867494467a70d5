//! Gacha probability resolver.
//!
//! A pull picks a rarity tier from a weighted table, then an archetype
//! uniformly within that tier. A pity counter forces the pity tier after a
//! fixed number of pulls without a sufficiently rare result, and the luck
//! multiplier adjusts the tier table according to a [`LuckBias`] policy.
//!
//! All randomness comes from the caller's RNG, so a seeded RNG reproduces
//! a pull sequence exactly.
//!
//! # Example
//!
//! ```
//! use beetle_core::catalog::Catalog;
//! use beetle_core::gacha::{GachaConfig, GachaResolver, PityCounter};
//! use beetle_core::math::Fixed;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let catalog = Catalog::builtin();
//! let config = GachaConfig::default();
//! let resolver = GachaResolver::new(&catalog, &config);
//! let mut pity = PityCounter::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//!
//! let pulls = resolver.pull(11, Fixed::from_num(1), &mut pity, &mut rng);
//! assert_eq!(pulls.len(), 11);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{ArchetypeId, Catalog, Rarity, MAX_RARITY};
use crate::math::Fixed;

const TIERS: usize = MAX_RARITY as usize;

/// Tier weights in permille (tenths of a percent), index 0 is tier 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights([u32; TIERS]);

impl RarityWeights {
    /// Reference table: 79.3 / 15 / 4 / 1 / 0.5 / 0.2 percent.
    pub const BASE: Self = Self([793, 150, 40, 10, 5, 2]);

    /// Build a weight table.
    ///
    /// # Panics
    ///
    /// Panics if the weights do not sum to exactly 1000.
    #[must_use]
    pub fn new(permille: [u32; TIERS]) -> Self {
        let sum: u32 = permille.iter().sum();
        assert!(sum == 1000, "rarity weights must sum to 1000 permille, got {sum}");
        Self(permille)
    }

    /// Weight of a tier in permille.
    #[must_use]
    pub const fn permille(&self, rarity: Rarity) -> u32 {
        self.0[rarity.index()]
    }

    fn percent(&self, index: usize) -> Fixed {
        Fixed::from_num(self.0[index]) / Fixed::from_num(10)
    }
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self::BASE
    }
}

/// How the luck multiplier reshapes the tier table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LuckBias {
    /// Scale every tier by the multiplier, then renormalize.
    ///
    /// Relative odds are unchanged whatever the multiplier.
    #[default]
    Uniform,
    /// Scale tiers 2 and above by the multiplier; tier 1 takes what is left.
    ///
    /// If the boosted tiers alone exceed 100%, they are renormalized to 100%
    /// and tier 1 gets nothing.
    TierSelective,
}

/// Gacha prices and rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaConfig {
    /// SG cost of a single pull.
    pub single_cost: u64,
    /// SG cost of a multi-pull.
    pub multi_cost: u64,
    /// Pulls in a multi-pull.
    pub multi_count: u32,
    /// Pulls without a pity-tier result that force the pity tier.
    pub pity_threshold: u32,
    /// Tier forced by pity; results at or above it reset the counter.
    pub pity_tier: u8,
    /// SG paid for selling one agent.
    pub sell_price: u64,
    /// Base tier weights.
    pub weights: RarityWeights,
    /// Luck policy.
    pub bias: LuckBias,
}

impl Default for GachaConfig {
    fn default() -> Self {
        Self {
            single_cost: 500,
            multi_cost: 5000,
            multi_count: 11,
            pity_threshold: 200,
            pity_tier: 5,
            sell_price: 100,
            weights: RarityWeights::BASE,
            bias: LuckBias::Uniform,
        }
    }
}

impl GachaConfig {
    fn pity_rarity(&self) -> Rarity {
        Rarity::clamped(self.pity_tier)
    }
}

/// Pulls since the last pity-tier result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityCounter(u32);

impl PityCounter {
    /// Counter at a given value.
    #[must_use]
    pub const fn new(pulls_since_pity: u32) -> Self {
        Self(pulls_since_pity)
    }

    /// Pulls since the last reset.
    #[must_use]
    pub const fn pulls_since_pity(self) -> u32 {
        self.0
    }

    /// Pulls left before pity triggers, counting the triggering pull.
    #[must_use]
    pub const fn remaining(self, threshold: u32) -> u32 {
        threshold.saturating_sub(self.0)
    }
}

/// Outcome of one pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    /// Archetype obtained.
    pub archetype: ArchetypeId,
    /// Tier of the result.
    pub rarity: Rarity,
    /// Whether pity forced this result.
    pub pity: bool,
}

/// Tier odds in percent after applying `multiplier` under `bias`.
///
/// Index 0 is tier 1. The entries sum to 100 up to fixed-point rounding.
#[must_use]
pub fn adjusted_odds(weights: &RarityWeights, multiplier: Fixed, bias: LuckBias) -> [Fixed; TIERS] {
    let hundred = Fixed::from_num(100);
    let mut odds = [Fixed::ZERO; TIERS];

    match bias {
        LuckBias::Uniform => {
            let mut total = Fixed::ZERO;
            for (i, slot) in odds.iter_mut().enumerate() {
                *slot = weights.percent(i).saturating_mul(multiplier);
                total += *slot;
            }
            if total > Fixed::ZERO {
                for slot in &mut odds {
                    *slot = *slot * hundred / total;
                }
            }
        }
        LuckBias::TierSelective => {
            let mut boosted = Fixed::ZERO;
            for (i, slot) in odds.iter_mut().enumerate().skip(1) {
                *slot = weights.percent(i).saturating_mul(multiplier);
                boosted += *slot;
            }
            if boosted > hundred {
                for slot in odds.iter_mut().skip(1) {
                    *slot = *slot * hundred / boosted;
                }
            } else {
                odds[0] = hundred - boosted;
            }
        }
    }

    odds
}

/// Resolves pulls against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct GachaResolver<'a> {
    catalog: &'a Catalog,
    config: &'a GachaConfig,
}

impl<'a> GachaResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub const fn new(catalog: &'a Catalog, config: &'a GachaConfig) -> Self {
        Self { catalog, config }
    }

    /// Perform `count` pulls, updating `pity` as it goes.
    ///
    /// Each pull advances the counter; reaching the threshold forces the
    /// pity tier, and any result at or above the pity tier resets it.
    pub fn pull<R: Rng + ?Sized>(
        &self,
        count: u32,
        multiplier: Fixed,
        pity: &mut PityCounter,
        rng: &mut R,
    ) -> Vec<Pull> {
        let odds = adjusted_odds(&self.config.weights, multiplier, self.config.bias);
        let pity_rarity = self.config.pity_rarity();
        let mut pulls = Vec::with_capacity(count as usize);

        for _ in 0..count {
            pity.0 = pity.0.saturating_add(1);
            let forced = pity.0 >= self.config.pity_threshold;
            let rarity = if forced {
                pity_rarity
            } else {
                draw_tier(&odds, rng)
            };

            let Some((rarity, archetype)) = self.pick_in_tier(rarity, rng) else {
                continue;
            };

            if forced || rarity >= pity_rarity {
                if forced {
                    tracing::debug!(pulls = pity.0, ?archetype, "Pity triggered");
                }
                pity.0 = 0;
            }

            pulls.push(Pull {
                archetype,
                rarity,
                pity: forced,
            });
        }

        pulls
    }

    /// Uniform pick within `rarity`, falling back to lower then higher tiers
    /// when a tier has no members.
    fn pick_in_tier<R: Rng + ?Sized>(
        &self,
        rarity: Rarity,
        rng: &mut R,
    ) -> Option<(Rarity, ArchetypeId)> {
        let lower = (1..=rarity.tier()).rev();
        let higher = (rarity.tier() + 1)..=MAX_RARITY;

        for tier in lower.chain(higher) {
            let Some(candidate) = Rarity::new(tier) else {
                continue;
            };
            let members = self.catalog.tier_members(candidate);
            if !members.is_empty() {
                let index = rng.gen_range(0..members.len());
                return Some((candidate, members[index]));
            }
        }
        None
    }
}

/// Draw a tier: uniform value in [0, 100), walking tiers from rarest down.
fn draw_tier<R: Rng + ?Sized>(odds: &[Fixed; TIERS], rng: &mut R) -> Rarity {
    let draw = Fixed::from_num(rng.gen_range(0..1_000_000u32)) / Fixed::from_num(10_000);
    let mut cumulative = Fixed::ZERO;
    for rarity in Rarity::all().rev() {
        cumulative += odds[rarity.index()];
        if draw < cumulative {
            return rarity;
        }
    }
    Rarity::clamped(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tolerance() -> Fixed {
        ratio(1, 10_000)
    }

    #[test]
    fn test_base_weights_sum() {
        let total: u32 = Rarity::all().map(|r| RarityWeights::BASE.permille(r)).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    #[should_panic(expected = "must sum to 1000")]
    fn test_bad_weights_panic() {
        let _ = RarityWeights::new([500, 100, 0, 0, 0, 0]);
    }

    #[test]
    fn test_uniform_bias_is_a_no_op() {
        // Luck has no effect on odds under the uniform policy.
        let one = adjusted_odds(&RarityWeights::BASE, Fixed::from_num(1), LuckBias::Uniform);
        let two = adjusted_odds(&RarityWeights::BASE, Fixed::from_num(2), LuckBias::Uniform);
        for (a, b) in one.iter().zip(two.iter()) {
            assert!((*a - *b).abs() < tolerance());
        }
        assert!((one[0] - ratio(793, 10)).abs() < tolerance());
    }

    #[test]
    fn test_tier_selective_shifts_mass() {
        let odds = adjusted_odds(&RarityWeights::BASE, Fixed::from_num(2), LuckBias::TierSelective);
        // tiers 2-6 sum to 20.7%, doubled to 41.4%
        assert!((odds[1] - Fixed::from_num(30)).abs() < tolerance());
        assert!((odds[0] - ratio(586, 10)).abs() < tolerance());
    }

    #[test]
    fn test_tier_selective_renormalizes_overflow() {
        let odds = adjusted_odds(&RarityWeights::BASE, Fixed::from_num(10), LuckBias::TierSelective);
        assert_eq!(odds[0], Fixed::ZERO);
        let total = odds.iter().fold(Fixed::ZERO, |acc, v| acc + *v);
        assert!((total - Fixed::from_num(100)).abs() < tolerance());
    }

    #[test]
    fn test_frequencies_match_base_weights() {
        let catalog = Catalog::builtin();
        let config = GachaConfig {
            pity_threshold: u32::MAX,
            ..GachaConfig::default()
        };
        let resolver = GachaResolver::new(&catalog, &config);
        let mut pity = PityCounter::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let n = 100_000u32;
        let pulls = resolver.pull(n, Fixed::from_num(1), &mut pity, &mut rng);
        let mut counts = [0u32; TIERS];
        for pull in &pulls {
            counts[pull.rarity.index()] += 1;
        }

        for rarity in Rarity::all() {
            let observed = f64::from(counts[rarity.index()]) / f64::from(n);
            let expected = f64::from(RarityWeights::BASE.permille(rarity)) / 1000.0;
            assert!(
                (observed - expected).abs() < 0.005,
                "tier {} observed {observed}, expected {expected}",
                rarity.tier()
            );
        }
    }

    #[test]
    fn test_pity_forces_tier_five() {
        let catalog = Catalog::builtin();
        // Only tier 1 can be drawn, so every pull misses pity naturally.
        let config = GachaConfig {
            weights: RarityWeights::new([1000, 0, 0, 0, 0, 0]),
            pity_threshold: 10,
            ..GachaConfig::default()
        };
        let resolver = GachaResolver::new(&catalog, &config);
        let mut pity = PityCounter::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let pulls = resolver.pull(10, Fixed::from_num(1), &mut pity, &mut rng);
        assert!(pulls[..9].iter().all(|p| !p.pity && p.rarity.tier() == 1));
        assert!(pulls[9].pity);
        assert_eq!(pulls[9].rarity.tier(), 5);
        assert_eq!(pity.pulls_since_pity(), 0);
    }

    #[test]
    fn test_pity_carries_across_calls() {
        let catalog = Catalog::builtin();
        let config = GachaConfig {
            weights: RarityWeights::new([1000, 0, 0, 0, 0, 0]),
            pity_threshold: 12,
            ..GachaConfig::default()
        };
        let resolver = GachaResolver::new(&catalog, &config);
        let mut pity = PityCounter::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pulls = resolver.pull(11, Fixed::from_num(1), &mut pity, &mut rng);
        assert_eq!(pulls.iter().filter(|p| p.pity).count(), 1);
        assert!(pulls[6].pity);
        assert_eq!(pity.pulls_since_pity(), 4);
    }

    #[test]
    fn test_natural_high_tier_resets_pity() {
        let catalog = Catalog::builtin();
        let config = GachaConfig {
            weights: RarityWeights::new([0, 0, 0, 0, 0, 1000]),
            ..GachaConfig::default()
        };
        let resolver = GachaResolver::new(&catalog, &config);
        let mut pity = PityCounter::new(150);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let pulls = resolver.pull(1, Fixed::from_num(1), &mut pity, &mut rng);
        assert_eq!(pulls[0].rarity.tier(), 6);
        assert!(!pulls[0].pity);
        assert_eq!(pity.pulls_since_pity(), 0);
    }

    #[test]
    fn test_seeded_pulls_reproduce() {
        let catalog = Catalog::builtin();
        let config = GachaConfig::default();
        let resolver = GachaResolver::new(&catalog, &config);

        let run = |seed| {
            let mut pity = PityCounter::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            resolver.pull(50, Fixed::from_num(1), &mut pity, &mut rng)
        };
        assert_eq!(run(11), run(11));
    }
}

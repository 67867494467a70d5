//! Player profile ledger.
//!
//! Everything a player owns between matches: balances, owned agents with
//! their growth records, the deck, gacha and luck state, and lifetime match
//! statistics. Every operation either applies in full or reports failure
//! (`false`/`None`) and leaves the profile untouched.
//!
//! Storage of the profile is the caller's concern; the type is
//! serde-derivable.
//!
//! # Example
//!
//! ```
//! use beetle_core::catalog::Catalog;
//! use beetle_core::economy::EconomyConfig;
//! use beetle_core::profile::PlayerProfile;
//! use beetle_core::stats::StatKind;
//!
//! let catalog = Catalog::builtin();
//! let economy = EconomyConfig::default();
//! let mut profile = PlayerProfile::new_default(&catalog);
//! let first = profile.deck()[0];
//!
//! // No SG yet.
//! assert!(!profile.upgrade_stat(&catalog, &economy, first, StatKind::Attack));
//! profile.add_sg(100);
//! assert!(profile.upgrade_stat(&catalog, &economy, first, StatKind::Attack));
//! assert_eq!(profile.wallet().sg, 80);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{RosterEntry, Team};
use crate::catalog::{ArchetypeId, Catalog, MAX_RARITY};
use crate::economy::{EconomyConfig, LuckProfile, MatchResult, MatchRewards, Wallet};
use crate::gacha::{GachaConfig, GachaResolver, PityCounter, Pull};
use crate::stats::{EffectiveStats, StatKind, UpgradeRecord};

/// Identifier of an owned agent, unique within a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnedId(u32);

impl OwnedId {
    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An agent the player owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedAgent {
    /// Identifier.
    pub id: OwnedId,
    /// Catalog archetype.
    pub archetype: ArchetypeId,
    /// Copy index among owned agents of the same archetype.
    pub slot: u32,
    /// Level and upgrades.
    pub record: UpgradeRecord,
}

/// Lifetime gacha counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaStats {
    /// Pulls ever made.
    pub total_pulls: u64,
    /// Pity progress.
    pub pity: PityCounter,
}

/// Lifetime match counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Matches finished.
    pub total_games: u32,
    /// Wins.
    pub wins: u32,
    /// Draws.
    pub draws: u32,
    /// Losses.
    pub losses: u32,
    /// Nectar delivered by the player's team.
    pub total_nectar_delivered: u64,
    /// Enemies knocked out by the player's team.
    pub total_enemies_defeated: u64,
}

/// Single or multi gacha pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullKind {
    /// One pull at the single price.
    Single,
    /// A batch at the multi price.
    Multi,
}

/// A gacha result that has been added to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObtainedAgent {
    /// New owned id.
    pub id: OwnedId,
    /// The pull that produced it.
    pub pull: Pull,
}

/// Persistent player state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    wallet: Wallet,
    agents: BTreeMap<OwnedId, OwnedAgent>,
    next_id: u32,
    deck: Vec<OwnedId>,
    cost_expansions: u32,
    gacha: GachaStats,
    luck: LuckProfile,
    game_stats: GameStats,
}

impl PlayerProfile {
    /// Fresh profile: one owned agent per CPU spawn slot, all in the deck.
    #[must_use]
    pub fn new_default(catalog: &Catalog) -> Self {
        let mut profile = Self {
            wallet: Wallet::default(),
            agents: BTreeMap::new(),
            next_id: 0,
            deck: Vec::new(),
            cost_expansions: 0,
            gacha: GachaStats::default(),
            luck: LuckProfile::default(),
            game_stats: GameStats::default(),
        };
        for archetype in catalog.iter() {
            for _ in 0..archetype.spawn_count {
                let id = profile.add_agent(archetype.id);
                profile.deck.push(id);
            }
        }
        profile
    }

    /// Balances.
    #[must_use]
    pub const fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Owned agent by id.
    #[must_use]
    pub fn agent(&self, id: OwnedId) -> Option<&OwnedAgent> {
        self.agents.get(&id)
    }

    /// All owned agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &OwnedAgent> {
        self.agents.values()
    }

    /// Deck in play order.
    #[must_use]
    pub fn deck(&self) -> &[OwnedId] {
        &self.deck
    }

    /// Deck cost expansions bought.
    #[must_use]
    pub const fn cost_expansions(&self) -> u32 {
        self.cost_expansions
    }

    /// Gacha counters.
    #[must_use]
    pub const fn gacha_stats(&self) -> &GachaStats {
        &self.gacha
    }

    /// Luck profile.
    #[must_use]
    pub const fn luck(&self) -> &LuckProfile {
        &self.luck
    }

    /// Lifetime match counters.
    #[must_use]
    pub const fn game_stats(&self) -> &GameStats {
        &self.game_stats
    }

    /// Add SG.
    pub fn add_sg(&mut self, amount: u64) {
        self.wallet.add_sg(amount);
    }

    /// Add LUP.
    pub fn add_lup(&mut self, amount: u64) {
        self.wallet.add_lup(amount);
    }

    fn add_agent(&mut self, archetype: ArchetypeId) -> OwnedId {
        let slot = self
            .agents
            .values()
            .filter(|a| a.archetype == archetype)
            .map(|a| a.slot + 1)
            .max()
            .unwrap_or(0);
        let id = OwnedId(self.next_id);
        self.next_id += 1;
        self.agents.insert(
            id,
            OwnedAgent {
                id,
                archetype,
                slot,
                record: UpgradeRecord::default(),
            },
        );
        id
    }

    /// Buy one upgrade of `stat` for an owned agent.
    ///
    /// Fails if the agent is unknown, the stat is at its level cap, or SG is
    /// short.
    pub fn upgrade_stat(
        &mut self,
        catalog: &Catalog,
        economy: &EconomyConfig,
        id: OwnedId,
        stat: StatKind,
    ) -> bool {
        let Some(owned) = self.agents.get(&id) else {
            return false;
        };
        let Some(archetype) = catalog.get(owned.archetype) else {
            return false;
        };
        let cost = economy.upgrade_cost(stat);
        if !owned.record.can_upgrade(&archetype.base, stat) || !self.wallet.can_afford_sg(cost) {
            return false;
        }

        let base = archetype.base;
        if let Some(owned) = self.agents.get_mut(&id) {
            self.wallet.spend_sg(cost);
            owned.record.try_upgrade(&base, stat);
            true
        } else {
            false
        }
    }

    /// Raise an owned agent's level, paying LUP.
    pub fn level_up(&mut self, economy: &EconomyConfig, id: OwnedId) -> bool {
        let Some(owned) = self.agents.get_mut(&id) else {
            return false;
        };
        let cost = economy.level_up_cost(owned.record.level);
        if !self.wallet.spend_lup(cost) {
            return false;
        }
        owned.record.level += 1;
        true
    }

    /// Buy one deck cost expansion.
    pub fn expand_deck_cost(&mut self, economy: &EconomyConfig) -> bool {
        if self.cost_expansions >= economy.max_expansions {
            return false;
        }
        if !self.wallet.spend_sg(economy.expansion_price(self.cost_expansions)) {
            return false;
        }
        self.cost_expansions += 1;
        true
    }

    /// Current deck cost cap.
    #[must_use]
    pub fn deck_cost_cap(&self, economy: &EconomyConfig) -> u32 {
        economy.deck_cost_cap(self.cost_expansions)
    }

    /// Summed deck cost of `ids`; unknown ids count zero.
    #[must_use]
    pub fn cost_of(&self, catalog: &Catalog, ids: &[OwnedId]) -> u32 {
        ids.iter()
            .filter_map(|id| self.agents.get(id))
            .filter_map(|owned| catalog.get(owned.archetype))
            .map(|a| a.deck_cost)
            .sum()
    }

    /// Summed deck cost of the current deck.
    #[must_use]
    pub fn deck_cost(&self, catalog: &Catalog) -> u32 {
        self.cost_of(catalog, &self.deck)
    }

    /// Replace the deck.
    ///
    /// Rejects unknown or repeated ids and decks over the cost cap.
    pub fn set_deck(&mut self, catalog: &Catalog, economy: &EconomyConfig, ids: Vec<OwnedId>) -> bool {
        let mut seen = BTreeSet::new();
        if !ids
            .iter()
            .all(|id| self.agents.contains_key(id) && seen.insert(*id))
        {
            return false;
        }
        if self.cost_of(catalog, &ids) > self.deck_cost_cap(economy) {
            return false;
        }
        self.deck = ids;
        true
    }

    /// Pay for and resolve a gacha pull, adding the results.
    ///
    /// Returns `None` without charging when SG is short.
    pub fn pull_gacha<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        config: &GachaConfig,
        kind: PullKind,
        rng: &mut R,
    ) -> Option<Vec<ObtainedAgent>> {
        let (cost, count) = match kind {
            PullKind::Single => (config.single_cost, 1),
            PullKind::Multi => (config.multi_cost, config.multi_count),
        };
        if !self.wallet.spend_sg(cost) {
            return None;
        }

        let multiplier = self.luck.multipliers().gacha;
        let pulls = GachaResolver::new(catalog, config).pull(count, multiplier, &mut self.gacha.pity, rng);
        self.gacha.total_pulls += u64::from(count);

        Some(
            pulls
                .into_iter()
                .map(|pull| ObtainedAgent {
                    id: self.add_agent(pull.archetype),
                    pull,
                })
                .collect(),
        )
    }

    /// Buy an archetype directly at its catalog price.
    ///
    /// Archetypes without a price cannot be bought.
    pub fn purchase(&mut self, catalog: &Catalog, archetype: ArchetypeId) -> Option<OwnedId> {
        let price = catalog.get(archetype)?.purchase_price?;
        if !self.wallet.spend_sg(price) {
            return None;
        }
        Some(self.add_agent(archetype))
    }

    /// Sell owned agents for SG.
    ///
    /// Deck members, top-tier agents and unknown ids are skipped. Returns
    /// the SG received, or `None` if nothing was sold.
    pub fn sell(&mut self, catalog: &Catalog, config: &GachaConfig, ids: &[OwnedId]) -> Option<u64> {
        let mut sold = 0u64;
        for id in ids {
            if self.deck.contains(id) {
                continue;
            }
            let Some(owned) = self.agents.get(id) else {
                continue;
            };
            let top_tier = catalog
                .get(owned.archetype)
                .map_or(false, |a| a.rarity.tier() == MAX_RARITY);
            if top_tier {
                continue;
            }
            self.agents.remove(id);
            sold += 1;
        }

        if sold == 0 {
            return None;
        }
        let proceeds = sold.saturating_mul(config.sell_price);
        self.wallet.add_sg(proceeds);
        Some(proceeds)
    }

    /// Buy the next luck level.
    pub fn upgrade_luck_level(&mut self) -> bool {
        let Some(cost) = crate::economy::luck_level_cost(self.luck.level()) else {
            return false;
        };
        if !self.wallet.can_afford_sg(cost) {
            return false;
        }
        self.wallet.spend_sg(cost);
        self.luck.advance_level()
    }

    /// Re-split luck points; they must sum to 100.
    pub fn distribute_luck(&mut self, gacha_points: u32, growth_points: u32) -> bool {
        self.luck.distribute(gacha_points, growth_points)
    }

    /// Count a finished match in the lifetime statistics.
    pub fn record_game(&mut self, result: MatchResult, nectar_delivered: u32, enemies_defeated: u32) {
        let stats = &mut self.game_stats;
        stats.total_games += 1;
        match result {
            MatchResult::Win => stats.wins += 1,
            MatchResult::Draw => stats.draws += 1,
            MatchResult::Lose => stats.losses += 1,
        }
        stats.total_nectar_delivered += u64::from(nectar_delivered);
        stats.total_enemies_defeated += u64::from(enemies_defeated);
    }

    /// Credit match rewards and record the game.
    pub fn settle_match(&mut self, rewards: &MatchRewards, nectar_delivered: u32, enemies_defeated: u32) {
        self.wallet.add_sg(rewards.sg);
        self.wallet.add_lup(rewards.lup);
        self.record_game(rewards.result, nectar_delivered, enemies_defeated);
    }

    /// Team A roster for the current deck, stats frozen now.
    ///
    /// Health, attack, defense and carry are rounded to whole numbers.
    #[must_use]
    pub fn roster(&self, catalog: &Catalog) -> Vec<RosterEntry> {
        self.deck
            .iter()
            .filter_map(|id| self.agents.get(id))
            .filter_map(|owned| {
                let archetype = catalog.get(owned.archetype)?;
                Some(RosterEntry {
                    archetype: owned.archetype,
                    team: Team::A,
                    slot: owned.slot,
                    level: owned.record.level,
                    stats: owned.record.resolve(&archetype.base).rounded(),
                })
            })
            .collect()
    }
}

/// Team B roster: each archetype repeated by its spawn multiplicity.
#[must_use]
pub fn cpu_roster(catalog: &Catalog) -> Vec<RosterEntry> {
    catalog
        .iter()
        .flat_map(|archetype| {
            (0..archetype.spawn_count).map(move |slot| RosterEntry {
                archetype: archetype.id,
                team: Team::B,
                slot,
                level: 1,
                stats: EffectiveStats::from(archetype.base),
            })
        })
        .collect()
}

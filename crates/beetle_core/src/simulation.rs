//! Match state and the per-tick controller.
//!
//! A [`Match`] owns everything that changes during play: the agents, the
//! two nectar pools, team scores, and the seeded RNG used for spawn and
//! respawn positions. It is built once from a roster and advanced with
//! [`Match::tick`].
//!
//! # Determinism
//!
//! - Fixed-point math only
//! - Randomness comes from a `ChaCha8Rng` seeded at construction
//! - Agents are processed in roster order for the whole match
//!
//! Roster order matters: an agent earlier in the list collects first when
//! two agents reach a nearly empty pool in the same tick.
//!
//! # Example
//!
//! ```
//! use beetle_core::catalog::Catalog;
//! use beetle_core::config::MatchConfig;
//! use beetle_core::economy::DifficultyMode;
//! use beetle_core::profile::PlayerProfile;
//! use beetle_core::simulation::Match;
//!
//! let catalog = Catalog::builtin();
//! let profile = PlayerProfile::new_default(&catalog);
//! let mode = DifficultyMode::by_id(1);
//! let mut game = Match::from_profile(MatchConfig::default(), &catalog, &profile, mode, 7).unwrap();
//!
//! game.tick();
//! assert_eq!(game.tick_count(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, AgentKey, AgentState, RosterEntry, Team};
use crate::behavior::{knockout_countdown, regenerate, step, StepOutcome};
use crate::catalog::Catalog;
use crate::combat::{combat_system, EliteClash, Knockout};
use crate::config::{FieldLayout, MatchConfig};
use crate::economy::DifficultyMode;
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::pool::{NectarPools, PoolId};
use crate::profile::{cpu_roster, PlayerProfile};
use crate::systems::{facing_system, integration_system, separation_system};

/// Ticks per second at the expected frame rate.
pub const TICK_RATE: u32 = 60;

/// Per-team counters kept over a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamStats {
    /// Nectar delivered to the home goal.
    pub nectar_delivered: u32,
    /// Opponents knocked out.
    pub enemies_defeated: u32,
}

/// Counters for both teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchStats {
    teams: [TeamStats; 2],
}

impl MatchStats {
    /// Counters for one team.
    #[must_use]
    pub const fn team(&self, team: Team) -> &TeamStats {
        &self.teams[team.index()]
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamStats {
        &mut self.teams[team.index()]
    }
}

/// Nectar taken from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    /// Collecting agent.
    pub agent: AgentId,
    /// Pool drawn from.
    pub pool: PoolId,
    /// Amount taken.
    pub amount: u32,
}

/// Nectar scored at a home goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Delivering agent.
    pub agent: AgentId,
    /// Team credited.
    pub team: Team,
    /// Amount scored.
    pub amount: u32,
}

/// A knocked-out agent came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Respawn {
    /// Agent respawned.
    pub agent: AgentId,
    /// Corner it reappeared at.
    pub position: Vec2Fixed,
}

/// Events generated during a tick.
///
/// For the UI layer: score popups, knockout effects, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Pool draws, in agent order.
    pub collections: Vec<Collection>,
    /// Scored deliveries.
    pub deliveries: Vec<Delivery>,
    /// Knockouts from combat.
    pub knockouts: Vec<Knockout>,
    /// Agents that finished their knockout countdown.
    pub respawns: Vec<Respawn>,
    /// Elite encounters.
    pub elite_clashes: Vec<EliteClash>,
}

/// One match in progress.
///
/// # Tick Order
///
/// 1. **Agents** - knockout countdown, or regeneration plus one FSM step
/// 2. **Combat** - proximity damage and knockouts
/// 3. **Separation** - overlap push-apart
/// 4. **Integration** - velocity, damping, field bounds
/// 5. **Facing** - heading from velocity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    config: MatchConfig,
    tick: u64,
    agents: Vec<Agent>,
    pools: NectarPools,
    scores: [u32; 2],
    stats: MatchStats,
    rng: ChaCha8Rng,
}

impl Match {
    /// Build a match from a roster.
    ///
    /// Agents keep the roster's order for the whole match. Team B entries
    /// get `cpu_bonus_percent` added to health, attack and defense. Entries
    /// naming an archetype missing from `catalog` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for an unusable field, including
    /// one too small for the catalog's largest agent, and
    /// [`GameError::EmptyPlayerRoster`] if no team A agent remains.
    pub fn new(
        config: MatchConfig,
        catalog: &Catalog,
        roster: &[RosterEntry],
        cpu_bonus_percent: u32,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        config.validate_radius(catalog.max_radius())?;
        let layout = config.layout();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut agents = Vec::with_capacity(roster.len());

        for entry in roster {
            let Some(archetype) = catalog.get(entry.archetype) else {
                tracing::warn!(
                    archetype = %entry.archetype,
                    "Skipping roster entry with unknown archetype"
                );
                continue;
            };
            let stats = match entry.team {
                Team::A => entry.stats,
                Team::B => entry.stats.with_bonus(cpu_bonus_percent),
            };
            let position = spawn_position(&config, &layout, entry.team, archetype.radius, &mut rng);
            let id = AgentId::new(
                u32::try_from(agents.len())
                    .map_err(|_| GameError::InvalidConfig("roster is too large".into()))?,
            );

            agents.push(Agent {
                id,
                key: AgentKey {
                    team: entry.team,
                    archetype: entry.archetype,
                    slot: entry.slot,
                },
                level: entry.level,
                position,
                velocity: Vec2Fixed::ZERO,
                health: stats.health,
                stats,
                carry_capacity: stats.carry.round().max(Fixed::ZERO).to_num(),
                carrying: 0,
                radius: archetype.radius,
                heading: Vec2Fixed::from_int(1, 0),
                state: AgentState::Idle,
                target: None,
                target_pool: None,
                knockout_ticks: 0,
            });
        }

        let player = agents.iter().filter(|a| a.team().is_player()).count();
        if player == 0 {
            return Err(GameError::EmptyPlayerRoster);
        }

        tracing::info!(
            player,
            cpu = agents.len() - player,
            cpu_bonus_percent,
            seed,
            "Match created"
        );

        Ok(Self {
            pools: NectarPools::new(layout.first_pool, layout.second_pool, config.initial_nectar),
            config,
            tick: 0,
            agents,
            scores: [0; 2],
            stats: MatchStats::default(),
            rng,
        })
    }

    /// Build a match from the player's deck against the standard CPU team.
    ///
    /// Player agents come first, then CPU agents.
    ///
    /// # Errors
    ///
    /// See [`Match::new`].
    pub fn from_profile(
        config: MatchConfig,
        catalog: &Catalog,
        profile: &PlayerProfile,
        mode: &DifficultyMode,
        seed: u64,
    ) -> Result<Self> {
        let mut roster = profile.roster(catalog);
        roster.extend(cpu_roster(catalog));
        Self::new(config, catalog, &roster, mode.cpu_bonus_percent, seed)
    }

    /// Advance the match by one tick.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        let layout = self.config.layout();
        let regen = self.config.regen_per_tick();

        // 1. Per-agent pass; pool draws are first come, first served
        for agent in &mut self.agents {
            if agent.is_knocked_out() {
                if let Some(position) = knockout_countdown(agent, &layout, &mut self.rng) {
                    events.respawns.push(Respawn {
                        agent: agent.id,
                        position,
                    });
                }
                continue;
            }

            regenerate(agent, regen);
            match step(agent, &mut self.pools, &layout, &self.config) {
                StepOutcome::None => {}
                StepOutcome::Collected { pool, amount } => {
                    events.collections.push(Collection {
                        agent: agent.id,
                        pool,
                        amount,
                    });
                }
                StepOutcome::Delivered { amount } => {
                    if amount > 0 {
                        let team = agent.team();
                        self.scores[team.index()] += amount;
                        self.stats.team_mut(team).nectar_delivered += amount;
                        tracing::debug!(agent = %agent.id, ?team, amount, "Nectar delivered");
                        events.deliveries.push(Delivery {
                            agent: agent.id,
                            team,
                            amount,
                        });
                    }
                }
            }
        }

        // 2. Combat
        let report = combat_system(&mut self.agents, &mut self.pools, &self.config);
        for knockout in &report.knockouts {
            if let Some(attacker) = self.agents.iter().find(|a| a.id == knockout.attacker) {
                self.stats.team_mut(attacker.team()).enemies_defeated += 1;
            }
        }
        events.knockouts = report.knockouts;
        events.elite_clashes = report.elite_clashes;

        // 3-5. Movement
        separation_system(&mut self.agents, &self.config);
        integration_system(&mut self.agents, &layout, &self.config);
        facing_system(&mut self.agents, &self.config);

        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Match state hash");
        }

        events
    }

    /// Issue a player click to one of the player's agents.
    ///
    /// Points outside the field are clamped onto it first. The click point
    /// decides the new state:
    /// - within collection range of a pool: `ToResource` for that pool
    /// - near the player's goal: `Carrying` (deliver whatever is carried)
    /// - anywhere else: `Manual` toward the point
    ///
    /// # Errors
    ///
    /// Rejects unknown agents, CPU agents and knocked-out agents without
    /// changing anything.
    pub fn command(&mut self, id: AgentId, point: Vec2Fixed) -> Result<AgentState> {
        let layout = self.config.layout();
        let collect_radius = self.config.collect_radius();
        let goal_radius = Fixed::from_num(self.config.goal_click_radius);
        let point = point.clamp(Vec2Fixed::ZERO, Vec2Fixed::new(layout.width, layout.height));

        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(GameError::AgentNotFound(id))?;
        if !agent.team().is_player() {
            return Err(GameError::NotPlayerControlled(id));
        }
        if agent.is_knocked_out() {
            return Err(GameError::AgentKnockedOut(id));
        }

        let pool = [PoolId::First, PoolId::Second]
            .into_iter()
            .find(|&p| point.is_within(self.pools.get(p).position, collect_radius));

        if let Some(pool) = pool {
            agent.state = AgentState::ToResource;
            agent.target_pool = Some(pool);
            agent.target = Some(self.pools.get(pool).position);
        } else if point.is_within(layout.goal(Team::A), goal_radius) {
            agent.state = AgentState::Carrying;
            agent.target_pool = None;
            agent.target = Some(layout.goal(Team::A));
        } else {
            agent.state = AgentState::Manual;
            agent.target_pool = None;
            agent.target = Some(point);
        }

        tracing::trace!(agent = %id, state = ?agent.state, "Command accepted");
        Ok(agent.state)
    }

    /// Current tick number.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Tuning constants.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Derived field positions.
    #[must_use]
    pub fn layout(&self) -> FieldLayout {
        self.config.layout()
    }

    /// All agents in processing order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up one agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Both pools.
    #[must_use]
    pub const fn pools(&self) -> &NectarPools {
        &self.pools
    }

    /// Quantities of the first and second pool.
    #[must_use]
    pub const fn pool_quantities(&self) -> (u32, u32) {
        self.pools.quantities()
    }

    /// One team's score.
    #[must_use]
    pub const fn score(&self, team: Team) -> u32 {
        self.scores[team.index()]
    }

    /// Scores indexed by [`Team::index`].
    #[must_use]
    pub const fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Match counters.
    #[must_use]
    pub const fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Number of agents on a team.
    #[must_use]
    pub fn team_size(&self, team: Team) -> usize {
        self.agents.iter().filter(|a| a.team() == team).count()
    }

    /// Nectar in pools, carried, and delivered. Constant over a match.
    #[must_use]
    pub fn nectar_accounted(&self) -> u64 {
        let carried: u64 = self.agents.iter().map(|a| u64::from(a.carrying)).sum();
        let delivered: u64 = self.scores.iter().copied().map(u64::from).sum();
        u64::from(self.pools.total()) + carried + delivered
    }

    /// Hash of the current state.
    ///
    /// Two matches with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.scores.hash(&mut hasher);
        self.pools.quantities().hash(&mut hasher);

        self.agents.len().hash(&mut hasher);
        for agent in &self.agents {
            agent.id.hash(&mut hasher);
            agent.state.hash(&mut hasher);
            agent.position.x.to_bits().hash(&mut hasher);
            agent.position.y.to_bits().hash(&mut hasher);
            agent.velocity.x.to_bits().hash(&mut hasher);
            agent.velocity.y.to_bits().hash(&mut hasher);
            agent.health.to_bits().hash(&mut hasher);
            agent.carrying.hash(&mut hasher);
            agent.knockout_ticks.hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the match for snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize match: {e}")))
    }

    /// Restore a match from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize match: {e}")))
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        let expected = 2 * u64::from(self.config.initial_nectar);
        assert_eq!(self.nectar_accounted(), expected, "nectar not conserved");
        for agent in &self.agents {
            assert!(agent.health >= Fixed::ZERO && agent.health <= agent.max_health());
            assert!(agent.carrying <= agent.carry_capacity);
        }
    }
}

/// Random point in a team's spawn band: anywhere across the field, within
/// `spawn_band_depth` of the band offset from the team's own edge.
fn spawn_position(
    config: &MatchConfig,
    layout: &FieldLayout,
    team: Team,
    radius: Fixed,
    rng: &mut ChaCha8Rng,
) -> Vec2Fixed {
    let fx = unit_fraction(rng);
    let fy = unit_fraction(rng);
    let depth = Fixed::from_num(config.spawn_band_depth);
    let offset = Fixed::from_num(config.spawn_band_offset);

    let x = fx * layout.width;
    let y = match team {
        Team::A => layout.height - fy * depth - offset,
        Team::B => fy * depth + offset,
    };
    let (min, max) = layout.bounds(radius);
    Vec2Fixed::new(x, y).clamp(min, max)
}

/// Uniform fraction in `[0, 1)`.
fn unit_fraction<R: Rng + ?Sized>(rng: &mut R) -> Fixed {
    Fixed::from_bits(i64::from(rng.gen::<u32>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ArchetypeId;
    use crate::stats::EffectiveStats;

    fn entry(team: Team, archetype: u16, slot: u32) -> RosterEntry {
        let catalog = Catalog::builtin();
        let archetype = ArchetypeId::new(archetype);
        let base = catalog.get(archetype).map(|a| a.base).unwrap();
        RosterEntry {
            archetype,
            team,
            slot,
            level: 1,
            stats: EffectiveStats::from(base),
        }
    }

    fn small_match(seed: u64) -> Match {
        let roster = vec![entry(Team::A, 0, 0), entry(Team::A, 1, 0), entry(Team::B, 0, 0)];
        Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, seed).unwrap()
    }

    #[test]
    fn test_new_match() {
        let game = small_match(1);
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.agents().len(), 3);
        assert_eq!(game.pool_quantities(), (150, 150));
        assert_eq!(game.scores(), [0, 0]);
        assert!(game.agents().iter().all(|a| a.state == AgentState::Idle));
        assert_eq!(game.agents()[2].id, AgentId::new(2));
    }

    #[test]
    fn test_empty_player_roster_rejected() {
        let roster = vec![entry(Team::B, 0, 0)];
        let result = Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, 1);
        assert!(matches!(result, Err(GameError::EmptyPlayerRoster)));
    }

    #[test]
    fn test_unknown_archetype_skipped() {
        let mut stray = entry(Team::A, 0, 1);
        stray.archetype = ArchetypeId::new(999);
        let roster = vec![stray.clone(), entry(Team::A, 0, 0), entry(Team::B, 0, 0)];
        let game = Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, 1).unwrap();
        assert_eq!(game.agents().len(), 2);

        let roster = vec![stray, entry(Team::B, 0, 0)];
        let result = Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, 1);
        assert!(matches!(result, Err(GameError::EmptyPlayerRoster)));
    }

    #[test]
    fn test_spawn_bands() {
        let game = small_match(5);
        for agent in game.agents() {
            let y = agent.position.y;
            match agent.team() {
                Team::A => assert!(y > Fixed::from_num(449) && y <= Fixed::from_num(550)),
                Team::B => assert!(y >= Fixed::from_num(50) && y < Fixed::from_num(151)),
            }
        }
    }

    #[test]
    fn test_cpu_bonus_applies_to_team_b_only() {
        let roster = vec![entry(Team::A, 0, 0), entry(Team::B, 0, 0)];
        let game = Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 50, 1).unwrap();
        let player = &game.agents()[0];
        let cpu = &game.agents()[1];
        let boosted = (player.max_health() * Fixed::from_num(3) / Fixed::from_num(2)).round();
        assert_eq!(cpu.max_health(), boosted);
        assert_eq!(cpu.stats.speed, player.stats.speed);
    }

    #[test]
    fn test_from_profile_uses_mode_bonus() {
        let catalog = Catalog::builtin();
        let profile = PlayerProfile::new_default(&catalog);
        let mode = DifficultyMode::by_id(5);
        let game = Match::from_profile(MatchConfig::default(), &catalog, &profile, mode, 3).unwrap();

        let cpu = game.agents().iter().find(|a| a.team() == Team::B).unwrap();
        assert_eq!(cpu.key.archetype, ArchetypeId::new(0));
        assert_eq!(cpu.max_health(), Fixed::from_num(36));
    }

    #[test]
    fn test_tick_increments() {
        let mut game = small_match(1);
        game.tick();
        game.tick();
        assert_eq!(game.tick_count(), 2);
    }

    #[test]
    fn test_idle_agents_head_for_pools() {
        let mut game = small_match(1);
        game.tick();
        assert!(game
            .agents()
            .iter()
            .all(|a| a.state == AgentState::ToResource && a.target_pool.is_some()));
    }

    #[test]
    fn test_command_classification() {
        let mut game = small_match(1);
        let layout = game.layout();
        let id = AgentId::new(0);

        let near_pool = layout.second_pool + Vec2Fixed::from_int(30, 0);
        assert_eq!(game.command(id, near_pool).unwrap(), AgentState::ToResource);
        assert_eq!(game.agent(id).unwrap().target_pool, Some(PoolId::Second));

        let near_goal = layout.goal(Team::A) + Vec2Fixed::from_int(0, 20);
        assert_eq!(game.command(id, near_goal).unwrap(), AgentState::Carrying);

        let open = Vec2Fixed::from_int(400, 150);
        assert_eq!(game.command(id, open).unwrap(), AgentState::Manual);
        assert_eq!(game.agent(id).unwrap().target, Some(open));
    }

    #[test]
    fn test_command_outside_field_is_clamped() {
        let config = MatchConfig {
            width: 30_000,
            ..MatchConfig::default()
        };
        let roster = vec![entry(Team::A, 0, 0)];
        let mut game = Match::new(config, &Catalog::builtin(), &roster, 0, 1).unwrap();
        let id = AgentId::new(0);

        let far = Vec2Fixed::from_int(99_000, 300);
        assert_eq!(game.command(id, far).unwrap(), AgentState::Manual);
        assert_eq!(game.agent(id).unwrap().target, Some(Vec2Fixed::from_int(30_000, 300)));
        for _ in 0..10 {
            game.tick();
        }
    }

    #[test]
    fn test_field_too_small_for_catalog_rejected() {
        let config = MatchConfig {
            width: 40,
            respawn_inset: 10,
            ..MatchConfig::default()
        };
        let roster = vec![entry(Team::A, 6, 0)];
        let result = Match::new(config, &Catalog::builtin(), &roster, 0, 1);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_field_rejected() {
        let config = MatchConfig {
            width: 100_000,
            ..MatchConfig::default()
        };
        let roster = vec![entry(Team::A, 0, 0)];
        let result = Match::new(config, &Catalog::builtin(), &roster, 0, 1);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_last_unit_goes_to_earlier_roster_entry() {
        let roster = vec![entry(Team::A, 0, 0), entry(Team::A, 0, 1)];
        let mut game = Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, 1).unwrap();
        game.pools.get_mut(PoolId::First).withdraw(149);
        game.pools.get_mut(PoolId::Second).withdraw(150);
        assert_eq!(game.pool_quantities(), (1, 0));

        let pool = game.layout().first_pool;
        for (agent, dy) in game.agents.iter_mut().zip([-10, 10]) {
            agent.position = pool + Vec2Fixed::from_int(0, dy);
            agent.state = AgentState::ToResource;
            agent.target_pool = Some(PoolId::First);
            agent.target = Some(pool);
        }

        let events = game.tick();
        assert_eq!(
            events.collections,
            vec![Collection {
                agent: AgentId::new(0),
                pool: PoolId::First,
                amount: 1,
            }]
        );
        let first = &game.agents()[0];
        assert_eq!(first.state, AgentState::Carrying);
        assert_eq!(first.carrying, 1);
        let second = &game.agents()[1];
        assert_eq!(second.state, AgentState::ToResource);
        assert_eq!(second.carrying, 0);
        assert_eq!(game.pool_quantities(), (0, 0));
    }

    #[test]
    fn test_command_rejections_leave_state() {
        let mut game = small_match(1);
        let point = Vec2Fixed::from_int(400, 300);

        assert!(matches!(
            game.command(AgentId::new(99), point),
            Err(GameError::AgentNotFound(_))
        ));
        assert!(matches!(
            game.command(AgentId::new(2), point),
            Err(GameError::NotPlayerControlled(_))
        ));
        assert_eq!(game.agents()[2].state, AgentState::Idle);

        game.agents[0].state = AgentState::Knockout;
        game.agents[0].knockout_ticks = 10;
        assert!(matches!(
            game.command(AgentId::new(0), point),
            Err(GameError::AgentKnockedOut(_))
        ));
        assert_eq!(game.agents()[0].state, AgentState::Knockout);
    }

    #[test]
    fn test_manual_move_arrives_and_stays() {
        let mut game = small_match(1);
        let id = AgentId::new(0);
        let target = Vec2Fixed::from_int(100, 420);
        assert_eq!(game.command(id, target).unwrap(), AgentState::Manual);

        for _ in 0..4_000 {
            game.tick();
            if game.agent(id).unwrap().state == AgentState::Staying {
                break;
            }
        }
        let agent = game.agent(id).unwrap();
        assert_eq!(agent.state, AgentState::Staying);
        assert_eq!(agent.target, None);
    }

    #[test]
    fn test_conservation_over_ticks() {
        let mut game = small_match(3);
        for _ in 0..2_000 {
            game.tick();
            assert_eq!(game.nectar_accounted(), 300);
        }
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let mut a = small_match(42);
        let mut b = small_match(42);
        for _ in 0..500 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_serialize_roundtrip_continues_identically() {
        let mut game = small_match(9);
        for _ in 0..100 {
            game.tick();
        }
        let bytes = game.serialize().unwrap();
        let mut restored = Match::deserialize(&bytes).unwrap();
        assert_eq!(restored.state_hash(), game.state_hash());

        for _ in 0..100 {
            game.tick();
            restored.tick();
        }
        assert_eq!(restored.state_hash(), game.state_hash());
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        assert!(matches!(
            Match::deserialize(&[1, 2, 3]),
            Err(GameError::InvalidState(_))
        ));
    }
}

//! Proximity combat.
//!
//! Opposing agents within reach damage each other every tick they stay in
//! range; there is no cooldown or targeting. An agent whose health drops
//! to zero is knocked out and any nectar it carried goes back to the
//! nearer pool.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, AgentState};
use crate::config::MatchConfig;
use crate::math::{Fixed, Vec2Fixed};
use crate::pool::{NectarPools, PoolId};

/// An agent was knocked out this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knockout {
    /// Agent knocked out.
    pub victim: AgentId,
    /// Agent that dealt the final damage.
    pub attacker: AgentId,
    /// Nectar returned to a pool, if the victim was carrying any.
    pub returned: Option<(PoolId, u32)>,
}

/// Two elite agents fought this tick. Observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliteClash {
    /// Lower-id combatant.
    pub first: AgentId,
    /// Higher-id combatant.
    pub second: AgentId,
    /// Midpoint between the two.
    pub position: Vec2Fixed,
}

/// Everything combat produced in one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Knockouts, in the order they happened.
    pub knockouts: Vec<Knockout>,
    /// Elite encounters.
    pub elite_clashes: Vec<EliteClash>,
}

/// Damage dealt per tick: `max(1, attack - defense) * multiplier`.
#[must_use]
pub fn calculate_damage(attack: Fixed, defense: Fixed, multiplier: Fixed) -> Fixed {
    (attack - defense).max(Fixed::from_num(1)) * multiplier
}

/// Combat reach between two agents.
#[must_use]
pub fn combat_reach(a: &Agent, b: &Agent, config: &MatchConfig) -> Fixed {
    a.radius + b.radius + Fixed::from_num(config.combat_range_bonus)
}

/// Apply one tick of combat to every agent, in slice order.
///
/// Each live agent damages every live opponent in reach. An agent knocked
/// out earlier in the pass neither deals nor takes further damage.
pub fn combat_system(
    agents: &mut [Agent],
    pools: &mut NectarPools,
    config: &MatchConfig,
) -> CombatReport {
    let mut report = CombatReport::default();
    let multiplier = config.damage_multiplier();

    for i in 0..agents.len() {
        if agents[i].is_knocked_out() {
            continue;
        }
        let attacker = agents[i].clone();

        for victim in agents.iter_mut() {
            if victim.team() == attacker.team() || victim.is_knocked_out() {
                continue;
            }
            let reach = combat_reach(&attacker, victim, config);
            if !attacker.position.is_within(victim.position, reach) {
                continue;
            }

            if attacker.id < victim.id && attacker.is_elite() && victim.is_elite() {
                report.elite_clashes.push(EliteClash {
                    first: attacker.id,
                    second: victim.id,
                    position: midpoint(attacker.position, victim.position),
                });
            }

            victim.health -=
                calculate_damage(attacker.stats.attack, victim.stats.defense, multiplier);
            if victim.health <= Fixed::ZERO {
                report.knockouts.push(knock_out(victim, attacker.id, pools, config));
            }
        }
    }

    report
}

fn knock_out(
    victim: &mut Agent,
    attacker: AgentId,
    pools: &mut NectarPools,
    config: &MatchConfig,
) -> Knockout {
    victim.health = Fixed::ZERO;
    victim.state = AgentState::Knockout;
    victim.knockout_ticks = config.knockout_ticks;
    victim.halt();
    victim.target_pool = None;

    let returned = (victim.carrying > 0).then(|| {
        let pool = pools.nearest(victim.position);
        pools.get_mut(pool).restore(victim.carrying);
        (pool, victim.carrying)
    });
    victim.carrying = 0;

    tracing::debug!(victim = %victim.id, %attacker, ?returned, "Agent knocked out");
    Knockout {
        victim: victim.id,
        attacker,
        returned,
    }
}

fn midpoint(a: Vec2Fixed, b: Vec2Fixed) -> Vec2Fixed {
    (a + b).scale(Fixed::from_num(1) / Fixed::from_num(2))
}

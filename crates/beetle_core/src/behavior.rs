//! Per-agent finite-state controller.
//!
//! Runs once per agent per tick, in roster order. An agent that drains a
//! pool changes what later agents in the same tick see: collection is
//! first-come, first-served.
//!
//! Knocked-out agents never reach [`step`]; they run [`knockout_countdown`]
//! instead.

use rand::Rng;

use crate::agent::{Agent, AgentState};
use crate::config::{FieldLayout, MatchConfig};
use crate::math::{Fixed, Vec2Fixed};
use crate::pool::{NectarPools, PoolId};

/// What an FSM step did to shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing outside the agent changed.
    None,
    /// Nectar was taken from a pool.
    Collected {
        /// Pool drawn from.
        pool: PoolId,
        /// Amount taken.
        amount: u32,
    },
    /// Carried nectar reached the home goal.
    Delivered {
        /// Amount delivered; may be zero after a manual "deliver" order.
        amount: u32,
    },
}

/// Regenerate health toward the maximum.
///
/// Only applies while `0 < health < max`.
pub fn regenerate(agent: &mut Agent, amount: Fixed) {
    let max = agent.max_health();
    if agent.health > Fixed::ZERO && agent.health < max {
        agent.health = (agent.health + amount).min(max);
    }
}

/// Advance one agent's state machine by one tick.
pub fn step(
    agent: &mut Agent,
    pools: &mut NectarPools,
    layout: &FieldLayout,
    config: &MatchConfig,
) -> StepOutcome {
    match agent.state {
        AgentState::Idle => {
            if let Some(pool) = pools.nearest_stocked(agent.position) {
                agent.state = AgentState::ToResource;
                agent.target_pool = Some(pool);
                agent.target = Some(pools.get(pool).position);
                tracing::trace!(agent = %agent.id, ?pool, "Idle -> ToResource");
            }
            StepOutcome::None
        }
        AgentState::ToResource => {
            let target = resource_target(agent, pools);
            let reach = config.collect_radius();
            if agent.position.is_within(target, reach) {
                collect(agent, pools, layout)
            } else {
                agent.steer_toward(target);
                StepOutcome::None
            }
        }
        AgentState::Carrying => {
            let goal = layout.goal(agent.team());
            let radius = Fixed::from_num(config.delivery_radius);
            if agent.position.is_within(goal, radius) {
                let amount = agent.carrying;
                agent.carrying = 0;
                agent.state = AgentState::Idle;
                agent.target = None;
                agent.target_pool = None;
                tracing::trace!(agent = %agent.id, amount, "Carrying -> Idle");
                StepOutcome::Delivered { amount }
            } else {
                agent.steer_toward(goal);
                StepOutcome::None
            }
        }
        AgentState::Manual => {
            match agent.target {
                Some(target) if !has_arrived(agent.position, target, config) => {
                    agent.steer_toward(target);
                }
                _ => {
                    agent.state = AgentState::Staying;
                    agent.halt();
                    tracing::trace!(agent = %agent.id, "Manual -> Staying");
                }
            }
            StepOutcome::None
        }
        AgentState::Staying => {
            agent.velocity = Vec2Fixed::ZERO;
            StepOutcome::None
        }
        AgentState::Knockout => StepOutcome::None,
    }
}

fn resource_target(agent: &Agent, pools: &NectarPools) -> Vec2Fixed {
    agent
        .target
        .or_else(|| agent.target_pool.map(|p| pools.get(p).position))
        .unwrap_or_else(|| pools.get(pools.nearest(agent.position)).position)
}

fn has_arrived(position: Vec2Fixed, target: Vec2Fixed, config: &MatchConfig) -> bool {
    let threshold = Fixed::from_num(config.arrival_threshold);
    position.distance_squared(target) <= threshold * threshold
}

/// Draw from the nearest stocked pool. A drained pair leaves the agent
/// waiting in `ToResource`.
fn collect(agent: &mut Agent, pools: &mut NectarPools, layout: &FieldLayout) -> StepOutcome {
    let Some(pool) = pools.nearest_stocked(agent.position) else {
        return StepOutcome::None;
    };
    let amount = pools.get_mut(pool).withdraw(agent.carry_capacity);
    if amount == 0 {
        return StepOutcome::None;
    }

    agent.carrying = amount;
    agent.state = AgentState::Carrying;
    agent.target = Some(layout.goal(agent.team()));
    agent.target_pool = None;
    tracing::trace!(agent = %agent.id, ?pool, amount, "ToResource -> Carrying");
    StepOutcome::Collected { pool, amount }
}

/// Count down a knocked-out agent; on expiry respawn it at a random corner
/// of its own half with 1 health.
///
/// Returns the respawn position when the agent comes back.
pub fn knockout_countdown<R: Rng + ?Sized>(
    agent: &mut Agent,
    layout: &FieldLayout,
    rng: &mut R,
) -> Option<Vec2Fixed> {
    agent.knockout_ticks = agent.knockout_ticks.saturating_sub(1);
    if agent.knockout_ticks > 0 {
        return None;
    }

    let corners = layout.respawn_corners(agent.team());
    let corner = corners[rng.gen_range(0..corners.len())];
    agent.health = Fixed::from_num(1);
    agent.state = AgentState::Idle;
    agent.position = corner;
    agent.velocity = Vec2Fixed::ZERO;
    agent.target = None;
    agent.target_pool = None;
    tracing::debug!(agent = %agent.id, x = %corner.x, y = %corner.y, "Agent respawned");
    Some(corner)
}

//! Movement systems.
//!
//! Run after the per-agent controller and combat, in this order:
//! [`separation_system`], [`integration_system`], [`facing_system`].
//! Knocked-out agents are ignored by all three.

use crate::agent::Agent;
use crate::config::{FieldLayout, MatchConfig};
use crate::math::Fixed;

/// Pushes overlapping agents apart.
///
/// Each live agent moves itself away from every other live agent closer
/// than `r_i + r_j + overlap_padding`, by `push_strength` of the overlap.
/// Positions update in place, so later agents see earlier pushes. Agents
/// sitting exactly on top of each other have no direction and are left
/// alone.
///
/// # Arguments
/// * `agents` - All agents, in roster order
/// * `config` - Supplies padding and push strength
pub fn separation_system(agents: &mut [Agent], config: &MatchConfig) {
    let padding = Fixed::from_num(config.overlap_padding);
    let strength = config.push_strength();

    for i in 0..agents.len() {
        if agents[i].is_knocked_out() {
            continue;
        }
        for j in 0..agents.len() {
            if i == j || agents[j].is_knocked_out() {
                continue;
            }
            let offset = agents[i].position - agents[j].position;
            let dist = offset.length();
            let min_dist = agents[i].radius + agents[j].radius + padding;
            if dist > Fixed::ZERO && dist < min_dist {
                let push = (min_dist - dist) * strength;
                let shift = offset.normalize().scale(push);
                agents[i].position += shift;
            }
        }
    }
}

/// Applies velocity, damping, and the field bounds.
///
/// `position += velocity`, then `velocity *= damping`, then the position is
/// clamped so the agent's body stays inside the field.
pub fn integration_system(agents: &mut [Agent], layout: &FieldLayout, config: &MatchConfig) {
    let damping = config.damping();
    for agent in agents.iter_mut().filter(|a| !a.is_knocked_out()) {
        agent.position += agent.velocity;
        agent.velocity = agent.velocity.scale(damping);
        let (min, max) = layout.bounds(agent.radius);
        agent.position = agent.position.clamp(min, max);
    }
}

/// Updates each agent's heading from its velocity.
///
/// Heading only changes when either velocity component exceeds the facing
/// threshold, so a drifting agent keeps its last heading.
pub fn facing_system(agents: &mut [Agent], config: &MatchConfig) {
    let threshold = config.facing_threshold();
    for agent in agents.iter_mut().filter(|a| !a.is_knocked_out()) {
        let v = agent.velocity;
        if v.x.abs() > threshold || v.y.abs() > threshold {
            agent.heading = v.normalize();
        }
    }
}

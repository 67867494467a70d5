//! Agent instances and roster entries.

use serde::{Deserialize, Serialize};

use crate::catalog::ArchetypeId;
use crate::math::{fixed_serde, option_vec_serde, Fixed, Vec2Fixed};
use crate::pool::PoolId;
use crate::stats::EffectiveStats;

/// Side of the field.
///
/// Team A is player-controlled and defends the bottom edge; team B is the
/// CPU and defends the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Player team (bottom).
    A,
    /// CPU team (top).
    B,
}

impl Team {
    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Whether this team takes manual commands.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::A)
    }

    /// Index into per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Stable surrogate identifier for an agent within a match.
///
/// Assigned in roster order starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Create an agent id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Structured identity of an agent: which team, which archetype, which copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentKey {
    /// Owning team.
    pub team: Team,
    /// Catalog archetype.
    pub archetype: ArchetypeId,
    /// Copy index among same-archetype agents on the team.
    pub slot: u32,
}

/// Finite state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Looking for a stocked pool.
    Idle,
    /// Heading to a pool.
    ToResource,
    /// Heading home with nectar.
    Carrying,
    /// Following a player-assigned point.
    Manual,
    /// Parked after a manual move.
    Staying,
    /// Down; counting down to respawn.
    Knockout,
}

/// One agent to spawn at match start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Catalog archetype.
    pub archetype: ArchetypeId,
    /// Owning team.
    pub team: Team,
    /// Copy index among same-archetype agents on the team.
    pub slot: u32,
    /// Owned agent level; only used to classify elite encounters.
    pub level: u32,
    /// Effective stats before any difficulty bonus.
    pub stats: EffectiveStats,
}

/// A live participant in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Surrogate id.
    pub id: AgentId,
    /// Structured identity.
    pub key: AgentKey,
    /// Owned agent level.
    pub level: u32,
    /// Position.
    pub position: Vec2Fixed,
    /// Velocity, units per tick.
    pub velocity: Vec2Fixed,
    /// Current health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Frozen stats; `stats.health` is the maximum health.
    pub stats: EffectiveStats,
    /// Whole-unit carry capacity.
    pub carry_capacity: u32,
    /// Nectar currently carried.
    pub carrying: u32,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Unit heading of the last significant movement.
    pub heading: Vec2Fixed,
    /// FSM state.
    pub state: AgentState,
    /// Movement target for pool runs and manual moves.
    #[serde(with = "option_vec_serde")]
    pub target: Option<Vec2Fixed>,
    /// Pool the agent is heading to.
    pub target_pool: Option<PoolId>,
    /// Ticks left in knockout.
    pub knockout_ticks: u32,
}

impl Agent {
    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.key.team
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> Fixed {
        self.stats.health
    }

    /// Whether the agent is knocked out.
    #[must_use]
    pub fn is_knocked_out(&self) -> bool {
        self.state == AgentState::Knockout
    }

    /// Whether this agent counts as elite for encounter classification.
    #[must_use]
    pub fn is_elite(&self) -> bool {
        self.level >= 5 || self.max_health() >= Fixed::from_num(80)
    }

    /// Facing angle in radians, for rendering only.
    #[must_use]
    pub fn facing_angle(&self) -> f64 {
        let x: f64 = self.heading.x.to_num();
        let y: f64 = self.heading.y.to_num();
        y.atan2(x)
    }

    /// Steer toward `point` at full speed.
    pub fn steer_toward(&mut self, point: Vec2Fixed) {
        self.velocity = (point - self.position).normalize().scale(self.stats.speed);
    }

    /// Stop and clear any movement target.
    pub fn halt(&mut self) {
        self.velocity = Vec2Fixed::ZERO;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;

    fn agent(max_health: i32, level: u32) -> Agent {
        let stats = EffectiveStats {
            health: Fixed::from_num(max_health),
            attack: Fixed::from_num(5),
            defense: Fixed::from_num(3),
            carry: Fixed::from_num(2),
            speed: Fixed::from_num(2),
        };
        Agent {
            id: AgentId::new(0),
            key: AgentKey {
                team: Team::A,
                archetype: ArchetypeId::new(0),
                slot: 0,
            },
            level,
            position: Vec2Fixed::ZERO,
            velocity: Vec2Fixed::ZERO,
            health: stats.health,
            stats,
            carry_capacity: 2,
            carrying: 0,
            radius: ratio(145, 10),
            heading: Vec2Fixed::from_int(1, 0),
            state: AgentState::Idle,
            target: None,
            target_pool: None,
            knockout_ticks: 0,
        }
    }

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::A.opponent(), Team::B);
        assert!(Team::A.is_player());
        assert!(!Team::B.is_player());
    }

    #[test]
    fn test_elite_by_level_or_health() {
        assert!(!agent(20, 1).is_elite());
        assert!(agent(20, 5).is_elite());
        assert!(agent(80, 1).is_elite());
    }

    #[test]
    fn test_steer_toward_uses_speed() {
        let mut a = agent(20, 1);
        a.steer_toward(Vec2Fixed::from_int(0, 100));
        assert_eq!(a.velocity.x, Fixed::ZERO);
        assert_eq!(a.velocity.y, Fixed::from_num(2));
    }

    #[test]
    fn test_facing_angle() {
        let mut a = agent(20, 1);
        a.heading = Vec2Fixed::from_int(0, 1);
        assert!((a.facing_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId::new(7).to_string(), "agent#7");
    }
}

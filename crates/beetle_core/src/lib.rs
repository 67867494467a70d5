//! # Beetle Core
//!
//! Deterministic simulation core for Beetle War.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every draw goes through a seeded RNG)
//! - Fixed-point math in the simulation
//!
//! The UI layer builds a [`Match`](simulation::Match) from a roster, calls
//! [`tick`](simulation::Match::tick) once per frame, forwards player clicks
//! through [`command`](simulation::Match::command), and reads agents, pools
//! and scores back out. Between matches the same layer drives the
//! [`PlayerProfile`](profile::PlayerProfile) ledger.
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Archetype table
//! - [`stats`] - Upgrade records and effective stats
//! - [`gacha`] - Rarity draws with pity
//! - [`economy`] - Cost, luck and reward formulas
//! - [`profile`] - Player-owned state
//! - [`simulation`] - Match state and tick controller
//! - [`behavior`] - Per-agent state machine
//! - [`combat`] - Proximity damage and knockouts
//! - [`systems`] - Separation, integration, facing
//! - [`referee`] - Win conditions and settlement
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod behavior;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod economy;
pub mod error;
pub mod gacha;
pub mod math;
pub mod pool;
pub mod profile;
pub mod referee;
pub mod simulation;
pub mod stats;
pub mod systems;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agent::{Agent, AgentId, AgentKey, AgentState, RosterEntry, Team};
    pub use crate::catalog::{Archetype, ArchetypeId, Catalog, Rarity};
    pub use crate::config::{FieldLayout, MatchConfig};
    pub use crate::economy::{
        DifficultyMode, EconomyConfig, LuckProfile, MatchResult, MatchRewards, Wallet,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::gacha::{GachaConfig, GachaResolver, LuckBias, PityCounter, Pull};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::pool::{NectarPools, PoolId};
    pub use crate::profile::{cpu_roster, OwnedId, PlayerProfile, PullKind};
    pub use crate::referee::{MatchOutcome, RefereeConfig};
    pub use crate::simulation::{Match, TickEvents};
    pub use crate::stats::{EffectiveStats, StatKind, UpgradeRecord};
}

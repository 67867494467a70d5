//! Test fixtures and helpers.
//!
//! Canned rosters and matches for consistent testing.

use beetle_core::agent::{RosterEntry, Team};
use beetle_core::catalog::{ArchetypeId, Catalog};
use beetle_core::config::MatchConfig;
use beetle_core::economy::DifficultyMode;
use beetle_core::profile::PlayerProfile;
use beetle_core::simulation::Match;
use beetle_core::stats::EffectiveStats;
use fixed::types::I32F32;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Install a log subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A kanabun-sized roster entry with custom speed and carry.
#[must_use]
pub fn runner(team: Team, slot: u32, speed: i32, carry: i32) -> RosterEntry {
    RosterEntry {
        archetype: ArchetypeId::new(0),
        team,
        slot,
        level: 1,
        stats: EffectiveStats {
            health: fixed(20),
            attack: fixed(5),
            defense: fixed(3),
            carry: fixed(carry),
            speed: fixed(speed),
        },
    }
}

/// A single fast player agent alone on the field.
///
/// # Panics
///
/// Panics if the match cannot be built, which would be a fixture bug.
#[must_use]
pub fn solo_runner_match(seed: u64) -> Match {
    let roster = [runner(Team::A, 0, 5, 2)];
    Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, seed)
        .expect("solo runner roster is valid")
}

/// Two runners per side with equal stats.
///
/// # Panics
///
/// Panics if the match cannot be built.
#[must_use]
pub fn mirror_match(seed: u64) -> Match {
    let roster = [
        runner(Team::A, 0, 2, 2),
        runner(Team::A, 1, 2, 2),
        runner(Team::B, 0, 2, 2),
        runner(Team::B, 1, 2, 2),
    ];
    Match::new(MatchConfig::default(), &Catalog::builtin(), &roster, 0, seed)
        .expect("mirror roster is valid")
}

/// A fresh profile's deck against the standard CPU team.
///
/// # Panics
///
/// Panics if the match cannot be built.
#[must_use]
pub fn standard_match(seed: u64, mode_id: u32) -> Match {
    let catalog = Catalog::builtin();
    let profile = PlayerProfile::new_default(&catalog);
    let mode = DifficultyMode::by_id(mode_id);
    Match::from_profile(MatchConfig::default(), &catalog, &profile, mode, seed)
        .expect("default profile has a deck")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_match_sizes() {
        let game = standard_match(1, 1);
        assert_eq!(game.team_size(Team::A), 12);
        assert_eq!(game.team_size(Team::B), 12);
        assert!(game.agents()[..12].iter().all(|a| a.team() == Team::A));
    }

    #[test]
    fn test_runner_speed() {
        let entry = runner(Team::B, 3, 7, 2);
        assert_eq!(entry.stats.speed, fixed(7));
        assert_eq!(entry.slot, 3);
    }
}

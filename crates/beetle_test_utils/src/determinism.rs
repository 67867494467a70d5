//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism a match has to avoid:
//!
//! - **Floating-point math**: positions, health and speed use
//!   [`beetle_core::math::Fixed`] throughout.
//!
//! - **Unseeded randomness**: spawn scatter and respawn corners draw from
//!   the match's own seeded RNG, which is part of its serialized state.
//!
//! - **Iteration order**: agents are processed in roster order; pools are
//!   drained first come, first served in that order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: per-module determinism inside `beetle_core`
//! 2. **Property tests**: random seeds and rosters still replay exactly
//! 3. **Parallel tests**: N matches on N threads all agree

use std::thread;

use beetle_core::simulation::Match;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of ticks per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one tick
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..ticks {
                step(&mut state);
            }
            hash(&state)
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run two matches from the same setup and compare final hashes.
pub fn verify_match_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Match,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |game| {
            game.tick();
        },
        Match::state_hash,
    )
    .is_deterministic
}

/// Run `num_matches` matches on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_matches<F>(
    setup_fn: F,
    num_matches: usize,
    num_ticks: u64,
) -> DeterminismResult
where
    F: Fn() -> Match + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    for _ in 0..num_ticks {
                        game.tick();
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick by tick.
///
/// Returns `None` if they never differ, or `Some(tick)` for the first tick
/// at which their hashes diverge.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick();
        second.tick();

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Check that a bincode snapshot taken mid-match restores to the same
/// state and keeps evolving identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Match,
{
    let mut game = setup_fn();
    for _ in 0..num_ticks {
        game.tick();
    }

    let Ok(bytes) = game.serialize() else {
        return false;
    };
    let Ok(mut restored) = Match::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != game.state_hash() {
        return false;
    }

    for _ in 0..num_ticks {
        game.tick();
        restored.tick();
    }
    restored.state_hash() == game.state_hash()
}

/// Proptest strategies for match inputs.
pub mod strategies {
    use beetle_core::agent::{RosterEntry, Team};
    use beetle_core::catalog::ArchetypeId;
    use beetle_core::math::{Fixed, Vec2Fixed};
    use beetle_core::stats::EffectiveStats;
    use proptest::prelude::*;

    /// Any match seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// A point on the default 800x600 field.
    pub fn arb_field_point() -> impl Strategy<Value = Vec2Fixed> {
        (0i32..800, 0i32..600).prop_map(|(x, y)| Vec2Fixed::from_int(x, y))
    }

    /// Effective stats in the catalog's range.
    pub fn arb_stats() -> impl Strategy<Value = EffectiveStats> {
        (10i32..150, 1i32..40, 0i32..30, 1i32..4, 10i32..60).prop_map(
            |(health, attack, defense, carry, speed_centi)| EffectiveStats {
                health: Fixed::from_num(health),
                attack: Fixed::from_num(attack),
                defense: Fixed::from_num(defense),
                carry: Fixed::from_num(carry),
                speed: Fixed::from_num(speed_centi) / Fixed::from_num(100),
            },
        )
    }

    /// A roster entry for one team with a builtin archetype.
    pub fn arb_roster_entry(team: Team) -> impl Strategy<Value = RosterEntry> {
        (0u16..17, 1u32..10, arb_stats()).prop_map(move |(archetype, level, stats)| RosterEntry {
            archetype: ArchetypeId::new(archetype),
            team,
            slot: 0,
            level,
            stats,
        })
    }

    /// A roster with at least one player agent, player agents first.
    pub fn arb_roster(max_per_team: usize) -> impl Strategy<Value = Vec<RosterEntry>> {
        (
            prop::collection::vec(arb_roster_entry(Team::A), 1..=max_per_team),
            prop::collection::vec(arb_roster_entry(Team::B), 0..=max_per_team),
        )
            .prop_map(|(mut player, cpu)| {
                player.extend(cpu);
                player
            })
    }
}

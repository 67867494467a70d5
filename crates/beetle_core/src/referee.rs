//! Win conditions and end-of-match settlement.
//!
//! [`Match`] only exposes scores and the tick count; deciding when a match
//! is over happens here, after each tick.

use serde::{Deserialize, Serialize};

use crate::agent::Team;
use crate::economy::{DifficultyMode, MatchResult, MatchRewards};
use crate::profile::PlayerProfile;
use crate::simulation::{Match, TICK_RATE};

/// Match length in seconds.
pub const MATCH_SECONDS: u64 = 180;

/// When a match ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeConfig {
    /// Score that ends the match immediately.
    pub target_score: u32,
    /// Ticks before time runs out.
    pub time_limit_ticks: u64,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            target_score: 100,
            time_limit_ticks: MATCH_SECONDS * u64::from(TICK_RATE),
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// One team won.
    Winner(Team),
    /// Equal scores.
    Draw,
}

impl MatchOutcome {
    /// The outcome from one team's point of view.
    #[must_use]
    pub fn result_for(self, team: Team) -> MatchResult {
        match self {
            Self::Winner(winner) if winner == team => MatchResult::Win,
            Self::Winner(_) => MatchResult::Lose,
            Self::Draw => MatchResult::Draw,
        }
    }
}

impl RefereeConfig {
    /// Check whether the match is over.
    ///
    /// Reaching the target score ends it at once; otherwise it ends when
    /// the time limit is hit. Either way the higher score wins and equal
    /// scores draw.
    #[must_use]
    pub fn evaluate(&self, game: &Match) -> Option<MatchOutcome> {
        let a = game.score(Team::A);
        let b = game.score(Team::B);
        let target_reached = a >= self.target_score || b >= self.target_score;
        let time_up = game.tick_count() >= self.time_limit_ticks;
        if !target_reached && !time_up {
            return None;
        }

        Some(match a.cmp(&b) {
            std::cmp::Ordering::Greater => MatchOutcome::Winner(Team::A),
            std::cmp::Ordering::Less => MatchOutcome::Winner(Team::B),
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        })
    }

    /// Ticks left on the clock.
    #[must_use]
    pub fn remaining_ticks(&self, game: &Match) -> u64 {
        self.time_limit_ticks.saturating_sub(game.tick_count())
    }
}

/// Tick `game` until the referee calls it.
pub fn play_out(game: &mut Match, referee: &RefereeConfig) -> MatchOutcome {
    loop {
        if let Some(outcome) = referee.evaluate(game) {
            tracing::info!(
                tick = game.tick_count(),
                score_a = game.score(Team::A),
                score_b = game.score(Team::B),
                ?outcome,
                "Match finished"
            );
            return outcome;
        }
        game.tick();
    }
}

/// Grant the player's rewards for a finished match and record it.
pub fn settle(
    profile: &mut PlayerProfile,
    game: &Match,
    outcome: MatchOutcome,
    mode: &DifficultyMode,
) -> MatchRewards {
    let stats = game.stats().team(Team::A);
    let player_agents = u32::try_from(game.team_size(Team::A)).unwrap_or(u32::MAX);
    let rewards = MatchRewards::compute(
        mode,
        outcome.result_for(Team::A),
        stats.nectar_delivered,
        stats.enemies_defeated,
        player_agents,
        profile.luck(),
    );
    profile.settle_match(&rewards, stats.nectar_delivered, stats.enemies_defeated);
    tracing::debug!(sg = rewards.sg, lup = rewards.lup, "Match settled");
    rewards
}

//! Batch matchup utilities for headless play.
//!
//! Runs many seeded matches to completion and aggregates the outcomes, for
//! checking that difficulty modes and rosters behave sensibly.

use beetle_core::agent::Team;
use beetle_core::referee::{play_out, MatchOutcome, RefereeConfig};
use beetle_core::simulation::Match;

/// Result of one played-out match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    /// Seed the match was built with.
    pub seed: u64,
    /// How it ended.
    pub outcome: MatchOutcome,
    /// Ticks until the referee called it.
    pub ticks: u64,
    /// Final team A score.
    pub score_a: u32,
    /// Final team B score.
    pub score_b: u32,
}

/// Aggregate over many matches.
#[derive(Debug, Clone, Default)]
pub struct MatchupStats {
    /// Matches played.
    pub total: u32,
    /// Team A wins.
    pub wins_a: u32,
    /// Team B wins.
    pub wins_b: u32,
    /// Draws.
    pub draws: u32,
    /// Average ticks to resolution.
    pub avg_ticks: f64,
}

impl MatchupStats {
    /// Build from individual reports.
    #[must_use]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        let mut stats = Self::default();
        let mut tick_sum = 0u64;
        for report in reports {
            stats.total += 1;
            tick_sum += report.ticks;
            match report.outcome {
                MatchOutcome::Winner(Team::A) => stats.wins_a += 1,
                MatchOutcome::Winner(Team::B) => stats.wins_b += 1,
                MatchOutcome::Draw => stats.draws += 1,
            }
        }
        if stats.total > 0 {
            stats.avg_ticks = tick_sum as f64 / f64::from(stats.total);
        }
        stats
    }

    /// Team A win rate (0.0 to 1.0).
    #[must_use]
    pub fn win_rate_a(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_a) / f64::from(self.total)
    }

    /// Team B win rate (0.0 to 1.0).
    #[must_use]
    pub fn win_rate_b(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_b) / f64::from(self.total)
    }

    /// Whether team A's win rate falls inside `[min_rate, max_rate]`.
    #[must_use]
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_a();
        rate >= min_rate && rate <= max_rate
    }
}

/// Play one match per seed to completion.
pub fn run_matchups<F>(
    setup: F,
    seeds: impl IntoIterator<Item = u64>,
    referee: &RefereeConfig,
) -> Vec<MatchReport>
where
    F: Fn(u64) -> Match,
{
    seeds
        .into_iter()
        .map(|seed| {
            let mut game = setup(seed);
            let outcome = play_out(&mut game, referee);
            MatchReport {
                seed,
                outcome,
                ticks: game.tick_count(),
                score_a: game.score(Team::A),
                score_b: game.score(Team::B),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{solo_runner_match, standard_match};

    #[test]
    fn test_empty_stats() {
        let stats = MatchupStats::from_reports(&[]);
        assert_eq!(stats.total, 0);
        assert!((stats.win_rate_a() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_solo_runner_always_wins() {
        let referee = RefereeConfig::default();
        let reports = run_matchups(solo_runner_match, 0..4, &referee);
        let stats = MatchupStats::from_reports(&reports);
        assert_eq!(stats.wins_a, 4);
        assert!(reports.iter().all(|r| r.score_a >= referee.target_score));
        assert!(stats.is_balanced(1.0, 1.0));
    }

    #[test]
    fn test_short_standard_matches_resolve() {
        let referee = RefereeConfig {
            target_score: 100,
            time_limit_ticks: 600,
        };
        let reports = run_matchups(|seed| standard_match(seed, 1), 0..3, &referee);
        let stats = MatchupStats::from_reports(&reports);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.wins_a + stats.wins_b + stats.draws, 3);
        assert!(reports.iter().all(|r| r.ticks <= 600));
    }
}

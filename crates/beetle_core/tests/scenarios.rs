//! End-to-end match scenarios.

use beetle_core::agent::{AgentState, Team};
use beetle_core::catalog::Catalog;
use beetle_core::config::MatchConfig;
use beetle_core::economy::{luck_level_cost, total_luck_cost, LuckProfile};
use beetle_core::error::GameError;
use beetle_core::math::Vec2Fixed;
use beetle_core::profile::{cpu_roster, PlayerProfile};
use beetle_core::referee::{MatchOutcome, RefereeConfig};
use beetle_core::simulation::Match;
use beetle_test_utils::fixtures::{fixed, init_tracing, runner, solo_runner_match};

#[test]
fn test_solo_runner_reaches_target_with_conservation() {
    init_tracing();
    let mut game = solo_runner_match(2024);
    let referee = RefereeConfig::default();
    assert_eq!(game.pool_quantities(), (150, 150));

    let outcome = loop {
        if let Some(outcome) = referee.evaluate(&game) {
            break outcome;
        }
        game.tick();

        assert_eq!(game.nectar_accounted(), 300);
        let agent = &game.agents()[0];
        assert!(agent.carrying <= agent.carry_capacity);
        assert!(agent.health > fixed(0) && agent.health <= agent.max_health());
    };

    assert_eq!(outcome, MatchOutcome::Winner(Team::A));
    assert_eq!(game.score(Team::A), 100);
    assert_eq!(game.score(Team::B), 0);
    assert!(game.tick_count() < referee.time_limit_ticks);
    let (first, second) = game.pool_quantities();
    assert_eq!(u64::from(first + second) + u64::from(game.agents()[0].carrying), 200);
}

#[test]
fn test_every_delivery_is_a_full_load() {
    let mut game = solo_runner_match(5);
    let mut delivered = 0;
    for _ in 0..3_000 {
        let events = game.tick();
        for delivery in events.deliveries {
            assert_eq!(delivery.amount, 2);
            assert_eq!(delivery.team, Team::A);
            delivered += delivery.amount;
        }
    }
    assert_eq!(delivered, game.score(Team::A));
    assert_eq!(game.stats().team(Team::A).nectar_delivered, delivered);
}

#[test]
fn test_empty_player_roster_is_rejected() {
    let catalog = Catalog::builtin();
    let cpu_only = cpu_roster(&catalog);

    for _ in 0..2 {
        let result = Match::new(MatchConfig::default(), &catalog, &cpu_only, 0, 1);
        assert!(matches!(result, Err(GameError::EmptyPlayerRoster)));
    }
    let result = Match::new(MatchConfig::default(), &catalog, &[], 0, 1);
    assert!(matches!(result, Err(GameError::EmptyPlayerRoster)));
}

#[test]
fn test_invalid_field_is_rejected() {
    let config = MatchConfig {
        width: 0,
        ..MatchConfig::default()
    };
    let roster = [runner(Team::A, 0, 2, 2)];
    let result = Match::new(config, &Catalog::builtin(), &roster, 0, 1);
    assert!(matches!(result, Err(GameError::InvalidConfig(_))));
}

#[test]
fn test_luck_level_ten_multipliers() {
    let luck = LuckProfile::new(10, 100, 0);
    let multipliers = luck.multipliers();
    assert_eq!(multipliers.gacha, fixed(2));
    assert_eq!(multipliers.growth, fixed(1));
}

#[test]
fn test_luck_level_ten_through_profile() {
    let catalog = Catalog::builtin();
    let mut profile = PlayerProfile::new_default(&catalog);
    profile.add_sg(total_luck_cost(10));
    for _ in 1..10 {
        assert!(profile.upgrade_luck_level());
    }
    assert_eq!(profile.wallet().sg, 0);
    assert_eq!(profile.luck().level(), 10);
    assert!(!profile.upgrade_luck_level());
    assert_eq!(luck_level_cost(10), Some(14_000));

    assert!(profile.distribute_luck(100, 0));
    let multipliers = profile.luck().multipliers();
    assert_eq!(multipliers.gacha, fixed(2));
    assert_eq!(multipliers.growth, fixed(1));
}

#[test]
fn test_knockout_lasts_exactly_the_countdown() {
    let catalog = Catalog::builtin();
    let config = MatchConfig::default();
    let mut brute = runner(Team::A, 0, 5, 2);
    brute.stats.health = fixed(500);
    brute.stats.attack = fixed(100);
    brute.stats.defense = fixed(50);
    let victim = runner(Team::B, 0, 0, 2);
    let mut game = Match::new(config.clone(), &catalog, &[brute, victim], 0, 77).unwrap();

    let brute_id = game.agents()[0].id;
    let victim_id = game.agents()[1].id;
    let victim_position = game.agents()[1].position;
    assert_eq!(game.command(brute_id, victim_position).unwrap(), AgentState::Manual);

    let mut knocked_out = false;
    for _ in 0..2_000 {
        let events = game.tick();
        if events.knockouts.iter().any(|k| k.victim == victim_id) {
            knocked_out = true;
            break;
        }
    }
    assert!(knocked_out, "victim was never reached");
    let clear_of_corners = Vec2Fixed::from_int(400, 400);
    assert_eq!(game.command(brute_id, clear_of_corners).unwrap(), AgentState::Manual);
    assert_eq!(game.stats().team(Team::A).enemies_defeated, 1);

    let victim = game.agent(victim_id).unwrap();
    assert_eq!(victim.state, AgentState::Knockout);
    assert_eq!(victim.health, fixed(0));
    assert_eq!(victim.knockout_ticks, config.knockout_ticks);

    for _ in 1..config.knockout_ticks {
        let events = game.tick();
        assert!(events.respawns.is_empty());
        assert_eq!(game.agent(victim_id).unwrap().state, AgentState::Knockout);
    }

    let events = game.tick();
    assert_eq!(events.respawns.len(), 1);
    let victim = game.agent(victim_id).unwrap();
    assert_eq!(victim.state, AgentState::Idle);
    assert_eq!(victim.health, fixed(1));
    let corners = game.layout().respawn_corners(Team::B);
    assert!(corners.contains(&victim.position));
}

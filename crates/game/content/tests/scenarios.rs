//! End-to-end combats over the shipped data files.

use tactics_content::{Content, ContentFactory, Scenario};
use tactics_core::{
    ActionLog, CombatPhaseSolver, CombatSetup, CombatState, PcgStream, PlaybackEntry,
    PlaybackKind, Side, UnitId,
};

fn factory() -> ContentFactory {
    ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

fn load(name: &str) -> (Content, Scenario, CombatState) {
    let factory = factory();
    let content = factory.load_content().unwrap();
    let scenario = factory.load_scenario(name).unwrap();
    let state = scenario.build_state(&content.catalog).unwrap();
    (content, scenario, state)
}

fn fight(
    content: &Content,
    state: &mut CombatState,
    log: &mut ActionLog,
    setup: &CombatSetup,
) -> Vec<PlaybackEntry> {
    let env = content.env();
    let mut solver = CombatPhaseSolver::new(env, &*state, setup).unwrap();
    let output = solver.run_to_end(env, state, log).unwrap();
    solver.finish(env, state, log).unwrap();
    output.playback
}

fn outcomes(playback: &[PlaybackEntry]) -> Vec<(PlaybackKind, Option<UnitId>)> {
    playback
        .iter()
        .filter(|entry| entry.is_outcome())
        .map(|entry| (entry.kind(), entry.actor()))
        .collect()
}

#[test]
fn every_scenario_builds_against_the_catalog() {
    let factory = factory();
    let content = factory.load_content().unwrap();
    for name in ["duel", "vantage", "brave", "scripted", "skirmish"] {
        let scenario = factory.load_scenario(name).unwrap();
        assert!(!scenario.combats.is_empty(), "{name} has no combats");
        scenario.build_state(&content.catalog).unwrap();
    }
}

#[test]
fn sure_hit_against_unarmed_target() {
    let (content, scenario, mut state) = load("duel");
    let mut log = ActionLog::new();
    let playback = fight(&content, &mut state, &mut log, &scenario.combats[0]);

    let damage: Vec<_> = playback
        .iter()
        .filter_map(|entry| match entry {
            PlaybackEntry::Damage { amount, .. } => Some(*amount),
            _ => None,
        })
        .collect();
    assert_eq!(damage, vec![10]);
    assert_eq!(state.units[&UnitId(2)].hp, 10);
    assert!(playback.iter().all(|entry| !matches!(
        entry,
        PlaybackEntry::PhaseStart {
            side: Side::Defender,
            ..
        }
    )));

    let seth = &state.units[&UnitId(1)];
    assert_eq!(seth.exp, 10);
    assert_eq!(seth.weapon_exp_for("sword"), 1);
}

#[test]
fn vantage_opens_with_the_defender_for_any_seed() {
    for seed in [1, 2, 3, 99, 4096] {
        let (content, scenario, mut state) = load("vantage");
        state.rng = PcgStream::from_seed(seed);
        let playback = fight(&content, &mut state, &mut ActionLog::new(), &scenario.combats[0]);
        assert_eq!(
            playback.first(),
            Some(&PlaybackEntry::PhaseStart {
                side: Side::Defender,
                unit: UnitId(2),
            })
        );
    }
}

#[test]
fn brave_weapon_strikes_twice_before_the_counter() {
    for seed in [7, 8, 9] {
        let (content, scenario, mut state) = load("brave");
        state.rng = PcgStream::from_seed(seed);
        let playback = fight(&content, &mut state, &mut ActionLog::new(), &scenario.combats[0]);
        let actors: Vec<_> = outcomes(&playback).into_iter().map(|(_, actor)| actor).collect();
        assert_eq!(&actors[..2], &[Some(UnitId(1)), Some(UnitId(1))]);
        assert_eq!(actors.get(2), Some(&Some(UnitId(2))));
    }
}

#[test]
fn script_overrides_the_odds() {
    for seed in [0, 31, 1 << 40] {
        let (content, scenario, mut state) = load("scripted");
        state.rng = PcgStream::from_seed(seed);
        let playback = fight(&content, &mut state, &mut ActionLog::new(), &scenario.combats[0]);
        assert_eq!(
            outcomes(&playback),
            vec![
                (PlaybackKind::Miss, Some(UnitId(1))),
                (PlaybackKind::Hit, Some(UnitId(2))),
            ]
        );
    }
}

#[test]
fn skirmish_is_deterministic_and_fully_reversible() {
    let (content, scenario, initial) = load("skirmish");

    let play = || {
        let mut state = initial.clone();
        let mut log = ActionLog::new();
        let playback: Vec<_> = scenario
            .combats
            .iter()
            .flat_map(|setup| fight(&content, &mut state, &mut log, setup))
            .collect();
        (state, log, playback)
    };
    let (mut state, mut log, playback) = play();
    let (again, again_log, again_playback) = play();
    assert_eq!(state, again);
    assert_eq!(log, again_log);
    assert_eq!(playback, again_playback);

    // Effective damage on the armored knight dwarfs a plain hit.
    let first_damage = playback.iter().find_map(|entry| match entry {
        PlaybackEntry::Damage {
            source: UnitId(1),
            target: UnitId(10),
            amount,
            ..
        } => Some(*amount),
        _ => None,
    });
    assert!(first_damage.is_some_and(|amount| amount >= 15));

    // Meteor splashes the neighbour of its target.
    assert!(playback.iter().any(|entry| matches!(
        entry,
        PlaybackEntry::Hit { attacker: UnitId(2), defender: UnitId(13) }
            | PlaybackEntry::Crit { attacker: UnitId(2), defender: UnitId(13) }
            | PlaybackEntry::Miss { attacker: UnitId(2), defender: UnitId(13) }
    )));
    assert!(playback.iter().any(|entry| matches!(
        entry,
        PlaybackEntry::Heal { source: UnitId(3), target: UnitId(1), .. }
    )));

    log.reverse_all(&mut state).unwrap();
    assert_eq!(state, initial);
}

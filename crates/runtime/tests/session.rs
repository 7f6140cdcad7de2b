//! Session pacing and time travel over the shipped scenarios.

use tactics_content::{ContentFactory, Scenario};
use tactics_core::{CombatError, CombatState, SolverState};
use tactics_runtime::{CombatSession, SessionError};

fn factory() -> ContentFactory {
    ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../game/content/data"))
}

fn session(name: &str) -> (CombatSession, Scenario, CombatState) {
    let factory = factory();
    let content = factory.load_content().unwrap();
    let scenario = factory.load_scenario(name).unwrap();
    let state = scenario.build_state(&content.catalog).unwrap();
    (CombatSession::new(content, state.clone()), scenario, state)
}

#[test]
fn stepping_matches_skipping() {
    let (mut skipped, scenario, _) = session("brave");
    let skipped_report = skipped.fight(&scenario.combats[0]).unwrap();

    let (mut stepped, _, _) = session("brave");
    stepped.start(&scenario.combats[0]).unwrap();
    assert_eq!(stepped.solver_state(), Some(SolverState::Init));
    let mut playback = Vec::new();
    while stepped.solver_state() != Some(SolverState::Terminal) {
        playback.extend(stepped.step().unwrap().playback);
    }
    let stepped_report = stepped.finish().unwrap();

    assert_eq!(playback, skipped_report.playback);
    assert_eq!(stepped_report, skipped_report);
    assert_eq!(stepped.state(), skipped.state());
    assert_eq!(stepped.log(), skipped.log());
}

#[test]
fn misuse_is_reported() {
    let (mut session, scenario, _) = session("duel");
    assert!(matches!(session.step(), Err(SessionError::NoActiveCombat)));

    session.start(&scenario.combats[0]).unwrap();
    assert!(matches!(
        session.start(&scenario.combats[0]),
        Err(SessionError::CombatInProgress)
    ));
    assert!(matches!(session.rewind(), Err(SessionError::CombatInProgress)));
    assert!(matches!(session.save(), Err(SessionError::CombatInProgress)));
    assert!(matches!(
        session.finish(),
        Err(SessionError::Combat(CombatError::NotTerminal))
    ));

    session.skip().unwrap();
    session.finish().unwrap();
    assert!(!session.in_combat());
    assert!(matches!(session.finish(), Err(SessionError::NoActiveCombat)));
}

#[test]
fn rewind_and_forward_walk_the_history() {
    let (mut session, scenario, initial) = session("skirmish");
    for setup in &scenario.combats {
        session.fight(setup).unwrap();
    }
    let end = session.state().clone();

    assert!(session.rewind().unwrap());
    assert_ne!(session.state(), &end);
    assert!(session.forward().unwrap());
    assert_eq!(session.state(), &end);
    assert!(!session.forward().unwrap());

    let rewound = session.rewind_by(usize::MAX).unwrap();
    assert!(rewound > scenario.combats.len());
    assert_eq!(session.state(), &initial);
    assert!(!session.rewind().unwrap());

    while session.forward().unwrap() {}
    assert_eq!(session.state(), &end);
}

#[test]
fn fighting_after_a_rewind_starts_a_new_timeline() {
    let (mut session, scenario, _) = session("skirmish");
    session.fight(&scenario.combats[0]).unwrap();
    session.fight(&scenario.combats[1]).unwrap();
    session.rewind().unwrap();
    assert!(session.log().can_forward());

    session.fight(&scenario.combats[2]).unwrap();
    assert!(!session.log().can_forward());
}

#[test]
fn abort_restores_the_board() {
    let (mut session, scenario, initial) = session("brave");
    session.start(&scenario.combats[0]).unwrap();
    session.step().unwrap();
    session.step().unwrap();
    assert_ne!(session.state(), &initial);

    session.abort().unwrap();
    assert!(!session.in_combat());
    assert_eq!(session.state(), &initial);
    assert!(!session.log().can_forward());
}

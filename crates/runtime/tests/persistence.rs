//! Save files on disk: atomic writes, integrity checks and resumed sessions.

use std::fs;

use tactics_content::{Content, ContentFactory, Scenario};
use tactics_runtime::{
    CombatSession, FileRepository, RepositoryError, SaveFile, SaveRepository, SessionError,
};
use tempfile::TempDir;

fn factory() -> ContentFactory {
    ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../game/content/data"))
}

fn content() -> Content {
    factory().load_content().unwrap()
}

fn skirmish() -> (CombatSession, Scenario) {
    let content = content();
    let scenario = factory().load_scenario("skirmish").unwrap();
    let state = scenario.build_state(&content.catalog).unwrap();
    (CombatSession::new(content, state), scenario)
}

#[test]
fn saves_are_written_atomically_and_listed() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path()).unwrap();
    let (mut session, scenario) = skirmish();
    session.fight(&scenario.combats[0]).unwrap();

    repo.save("border", &session.save().unwrap()).unwrap();
    repo.save("border-2", &session.save().unwrap()).unwrap();

    assert!(repo.exists("border"));
    assert!(!dir.path().join("border.json.tmp").exists());
    assert_eq!(repo.list_slots().unwrap(), vec!["border", "border-2"]);
    assert_eq!(repo.load("missing").unwrap(), None);

    repo.delete("border-2").unwrap();
    assert_eq!(repo.list_slots().unwrap(), vec!["border"]);
}

#[test]
fn resumed_session_continues_identically() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path()).unwrap();

    let (mut original, scenario) = skirmish();
    original.fight(&scenario.combats[0]).unwrap();
    original.fight(&scenario.combats[1]).unwrap();
    repo.save("midway", &original.save().unwrap()).unwrap();

    let save = repo.load("midway").unwrap().unwrap();
    let mut resumed = CombatSession::resume(content(), save).unwrap();
    assert_eq!(resumed.state(), original.state());
    assert_eq!(resumed.log(), original.log());

    for setup in &scenario.combats[2..] {
        let expected = original.fight(setup).unwrap();
        assert_eq!(resumed.fight(setup).unwrap(), expected);
    }
    assert_eq!(resumed.state(), original.state());

    // History survives the round trip.
    resumed.rewind_by(usize::MAX).unwrap();
    let (fresh, _) = skirmish();
    assert_eq!(resumed.state(), fresh.state());
}

#[test]
fn tampered_saves_are_rejected() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path()).unwrap();
    let (mut session, scenario) = skirmish();
    session.fight(&scenario.combats[0]).unwrap();
    repo.save("slot", &session.save().unwrap()).unwrap();

    let path = dir.path().join("slot.json");
    let mut json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["state"]["units"]["1"]["hp"] = serde_json::json!(16);
    json["state"]["units"]["10"]["hp"] = serde_json::json!(20);
    fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    assert!(matches!(
        repo.load("slot"),
        Err(RepositoryError::ChecksumMismatch { .. })
    ));

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(repo.load("slot"), Err(RepositoryError::Json(_))));
}

#[test]
fn resume_verifies_the_save() {
    let (session, _) = skirmish();
    let mut save: SaveFile = session.save().unwrap();
    save.checksum = "00".repeat(32);
    assert!(matches!(
        CombatSession::resume(content(), save),
        Err(SessionError::Repository(RepositoryError::ChecksumMismatch { .. }))
    ));
}

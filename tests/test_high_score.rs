use std::fs;

use neon_aim::error::StoreError;
use neon_aim::high_score::*;
use neon_aim::session::Session;
use neon_aim::GameConfig;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

#[test]
fn missing_file_reads_as_zero() {
    let dir = TempDir::new().unwrap();
    let store = FileHighScoreStore::new(dir.path());
    assert_eq!(store.load().unwrap(), 0);
    assert!(store.path().ends_with(HIGH_SCORE_KEY));
}

#[test]
fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = FileHighScoreStore::new(dir.path());
    store.save(1337).unwrap();
    assert_eq!(store.load().unwrap(), 1337);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "1337");
}

#[test]
fn save_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FileHighScoreStore::new(&nested);
    store.save(7).unwrap();
    assert_eq!(FileHighScoreStore::new(&nested).load().unwrap(), 7);
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(HIGH_SCORE_KEY), "  250\n").unwrap();
    assert_eq!(FileHighScoreStore::new(dir.path()).load().unwrap(), 250);
}

#[test]
fn garbage_is_reported_as_corrupted() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(HIGH_SCORE_KEY), "lots").unwrap();
    let err = FileHighScoreStore::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, StoreError::Corrupted(ref raw) if raw == "lots"));

    fs::write(dir.path().join(HIGH_SCORE_KEY), "-5").unwrap();
    assert!(FileHighScoreStore::new(dir.path()).load().is_err());
}

#[test]
fn memory_store_round_trip() {
    let store = MemoryHighScoreStore::new(3);
    assert_eq!(store.load().unwrap(), 3);
    store.save(90).unwrap();
    assert_eq!(store.get(), 90);
}

#[test]
fn session_survives_a_corrupted_record() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(HIGH_SCORE_KEY), "not a number").unwrap();

    let store = FileHighScoreStore::new(dir.path());
    let session = Session::new(
        GameConfig::survival(),
        Box::new(store),
        StdRng::seed_from_u64(1),
    );
    assert_eq!(session.high_score(), 0);
}

#[test]
fn session_reads_and_writes_the_file_store() {
    let dir = TempDir::new().unwrap();
    FileHighScoreStore::new(dir.path()).save(4).unwrap();

    let mut config = GameConfig::survival();
    config.ruleset.enabled_kinds = neon_aim::entities::KindSet::STANDARD;
    let mut session = Session::new(
        config,
        Box::new(FileHighScoreStore::new(dir.path())),
        StdRng::seed_from_u64(1),
    );
    assert_eq!(session.high_score(), 4);

    session.start(0);
    session.advance(0);
    let id = session.targets()[0].id;
    session.click(Some(id));
    session.end(None);

    assert_eq!(FileHighScoreStore::new(dir.path()).load().unwrap(), 10);
}

use neon_aim::entities::*;

fn target_at(x: f32, y: f32, size: f32) -> Target {
    Target {
        id: TargetId(1),
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        size,
        kind: TargetKind::Standard,
        created_at: 1_000,
        expires_at: 2_800,
    }
}

#[test]
fn kind_eq_and_flags() {
    assert_eq!(TargetKind::Golden, TargetKind::Golden);
    assert_ne!(TargetKind::Bomb, TargetKind::Life);

    let set = KindSet::STANDARD | KindSet::BOMB;
    assert!(set.allows(TargetKind::Standard));
    assert!(set.allows(TargetKind::Bomb));
    assert!(!set.allows(TargetKind::Life));
    assert!(!set.allows(TargetKind::Phantom));
}

#[test]
fn every_kind_has_its_own_flag() {
    let all = TargetKind::ALL
        .iter()
        .fold(KindSet::empty(), |acc, k| acc | k.flag());
    assert_eq!(all, KindSet::all());
}

#[test]
fn only_bombs_and_lives_escape_without_penalty() {
    assert!(TargetKind::Standard.penalized_on_expiry());
    assert!(TargetKind::Golden.penalized_on_expiry());
    assert!(TargetKind::Phantom.penalized_on_expiry());
    assert!(!TargetKind::Bomb.penalized_on_expiry());
    assert!(!TargetKind::Life.penalized_on_expiry());
}

// ── Target ────────────────────────────────────────────────────────────────────

#[test]
fn target_lifespan_and_expiry_boundary() {
    let t = target_at(100.0, 100.0, 40.0);
    assert_eq!(t.lifespan(), 1_800);
    assert!(!t.is_expired(2_799));
    // Expiry is inclusive of the deadline itself.
    assert!(t.is_expired(2_800));
    assert!(t.is_expired(5_000));
}

#[test]
fn contains_uses_radius_not_diameter() {
    let t = target_at(100.0, 100.0, 40.0);
    assert!(t.contains(100.0, 100.0, 0.0));
    assert!(t.contains(120.0, 100.0, 0.0));
    assert!(!t.contains(121.0, 100.0, 0.0));
    assert!(!t.contains(115.0, 115.0, 0.0));
}

#[test]
fn contains_widens_with_slack() {
    let t = target_at(100.0, 100.0, 40.0);
    assert!(!t.contains(130.0, 100.0, 0.0));
    assert!(t.contains(130.0, 100.0, 10.0));
}

#[test]
fn target_id_displays_with_hash() {
    assert_eq!(TargetId(42).to_string(), "#42");
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[test]
fn fresh_stats_start_at_full_accuracy() {
    let s = GameStats::default();
    assert_eq!(s.score, 0);
    assert_eq!(s.hits, 0);
    assert_eq!(s.misses, 0);
    assert_eq!(s.accuracy, 100.0);
    assert_eq!(s.time_remaining, None);

    let timed = GameStats::new(Some(30));
    assert_eq!(timed.time_remaining, Some(30));
}

#[test]
fn accuracy_of_matches_ratio() {
    assert_eq!(accuracy_of(0, 0), 100.0);
    assert_eq!(accuracy_of(3, 1), 75.0);
    assert_eq!(accuracy_of(0, 4), 0.0);
}

#[test]
fn stats_clone_is_independent() {
    let original = GameStats::new(Some(30));
    let mut cloned = original.clone();
    cloned.score = 999;
    cloned.misses = 3;
    assert_eq!(original.score, 0);
    assert_eq!(original.misses, 0);
}

#[test]
fn end_reason_messages() {
    assert_eq!(EndReason::TooManyMisses.to_string(), "MISS LIMIT REACHED.");
    assert_eq!(
        EndReason::TooManyBombs.to_string(),
        "CRITICAL FAILURE: TOO MANY BOMBS."
    );
}

#[test]
fn coach_message_deserializes_lowercase_sentiment() {
    let msg: CoachMessage =
        serde_json::from_str(r#"{"text":"Nice.","sentiment":"sarcastic"}"#).unwrap();
    assert_eq!(msg.text, "Nice.");
    assert_eq!(msg.sentiment, Sentiment::Sarcastic);
    assert_eq!(CoachMessage::neutral("hi").sentiment, Sentiment::Neutral);
}

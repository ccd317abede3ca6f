use neon_aim::compute::*;
use neon_aim::config::{Playfield, Points, Tuning};
use neon_aim::entities::*;

fn points() -> Points {
    Tuning::survival().points
}

fn target(id: u64, kind: TargetKind, x: f32, y: f32) -> Target {
    Target {
        id: TargetId(id),
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        size: 40.0,
        kind,
        created_at: 0,
        expires_at: 1_000,
    }
}

/// Click every target in order and return the final stats.
fn click_all(mut targets: Vec<Target>, mut stats: GameStats) -> GameStats {
    let ids: Vec<TargetId> = targets.iter().map(|t| t.id).collect();
    for id in ids {
        let out = resolve_click(&targets, &stats, Some(id), &points());
        targets = out.targets;
        stats = out.stats;
    }
    stats
}

// ── resolve_click ─────────────────────────────────────────────────────────────

#[test]
fn five_standard_hits_score_55() {
    let targets = (0..5)
        .map(|i| target(i, TargetKind::Standard, 100.0, 100.0))
        .collect();
    let s = click_all(targets, GameStats::default());
    assert_eq!(s.score, 55);
    assert_eq!(s.hits, 5);
    assert_eq!(s.current_combo, 5);
    assert_eq!(s.max_combo, 5);
    assert_eq!(s.accuracy, 100.0);
}

#[test]
fn golden_hit_pays_50() {
    let targets = vec![target(1, TargetKind::Golden, 0.0, 0.0)];
    let out = resolve_click(&targets, &GameStats::default(), Some(TargetId(1)), &points());
    assert_eq!(out.stats.score, 50);
    assert_eq!(
        out.effect,
        ClickEffect::Hit { id: TargetId(1), kind: TargetKind::Golden, points: 50, combo: 1 }
    );
    assert!(out.targets.is_empty());
}

#[test]
fn empty_click_counts_miss_and_breaks_combo() {
    let stats = GameStats {
        hits: 3,
        current_combo: 3,
        max_combo: 3,
        ..GameStats::default()
    };
    let out = resolve_click(&[], &stats, None, &points());
    assert_eq!(out.effect, ClickEffect::Missed);
    assert_eq!(out.stats.misses, 1);
    assert_eq!(out.stats.current_combo, 0);
    assert_eq!(out.stats.max_combo, 3);
    assert_eq!(out.stats.accuracy, 75.0);
}

#[test]
fn ten_empty_clicks_reach_the_miss_limit() {
    let tuning = Tuning::survival();
    let mut stats = GameStats::default();
    for i in 0..10 {
        assert_eq!(limit_reached(&stats, &tuning), None, "ended early at {}", i);
        stats = resolve_click(&[], &stats, None, &tuning.points).stats;
    }
    assert_eq!(stats.misses, 10);
    assert_eq!(stats.accuracy, 0.0);
    assert_eq!(limit_reached(&stats, &tuning), Some(EndReason::TooManyMisses));
}

#[test]
fn bomb_penalty_floors_score_at_zero_and_leaves_accuracy() {
    let stats = GameStats {
        score: 20,
        hits: 1,
        misses: 1,
        accuracy: 50.0,
        current_combo: 1,
        ..GameStats::default()
    };
    let targets = vec![target(7, TargetKind::Bomb, 0.0, 0.0)];
    let out = resolve_click(&targets, &stats, Some(TargetId(7)), &points());
    assert_eq!(out.stats.score, 0);
    assert_eq!(out.effect, ClickEffect::BombHit { id: TargetId(7), penalty: 20 });
    assert_eq!(out.stats.bomb_hits, 1);
    assert_eq!(out.stats.current_combo, 0);
    assert_eq!(out.stats.hits, 1);
    assert_eq!(out.stats.misses, 1);
    assert_eq!(out.stats.accuracy, 50.0);
}

#[test]
fn fifth_bomb_trips_the_bomb_limit() {
    let tuning = Tuning::survival();
    let stats = GameStats { score: 500, bomb_hits: 4, ..GameStats::default() };
    let targets = vec![target(1, TargetKind::Bomb, 0.0, 0.0)];
    let out = resolve_click(&targets, &stats, Some(TargetId(1)), &tuning.points);
    assert_eq!(out.stats.score, 450);
    assert_eq!(limit_reached(&out.stats, &tuning), Some(EndReason::TooManyBombs));
}

#[test]
fn life_repairs_one_miss() {
    let stats = GameStats {
        score: 40,
        hits: 3,
        misses: 3,
        accuracy: 50.0,
        current_combo: 2,
        max_combo: 2,
        ..GameStats::default()
    };
    let targets = vec![target(3, TargetKind::Life, 0.0, 0.0)];
    let out = resolve_click(&targets, &stats, Some(TargetId(3)), &points());
    assert_eq!(out.effect, ClickEffect::LifeCollected { id: TargetId(3), points: 25 });
    assert_eq!(out.stats.misses, 2);
    assert_eq!(out.stats.score, 65);
    assert_eq!(out.stats.hits, 3);
    assert_eq!(out.stats.current_combo, 3);
    assert_eq!(out.stats.max_combo, 3);
    assert!((out.stats.accuracy - 60.0).abs() < 1e-3);
}

#[test]
fn life_with_no_misses_stays_at_zero() {
    let targets = vec![target(3, TargetKind::Life, 0.0, 0.0)];
    let out = resolve_click(&targets, &GameStats::default(), Some(TargetId(3)), &points());
    assert_eq!(out.stats.misses, 0);
    assert_eq!(out.stats.score, 25);
}

#[test]
fn second_click_on_same_target_changes_nothing() {
    let targets = vec![target(1, TargetKind::Standard, 0.0, 0.0)];
    let first = resolve_click(&targets, &GameStats::default(), Some(TargetId(1)), &points());
    let second = resolve_click(&first.targets, &first.stats, Some(TargetId(1)), &points());
    assert_eq!(second.effect, ClickEffect::AlreadyGone { id: TargetId(1) });
    assert_eq!(second.stats, first.stats);
    assert_eq!(second.targets, first.targets);
}

#[test]
fn resolve_click_does_not_touch_inputs() {
    let targets = vec![target(1, TargetKind::Standard, 0.0, 0.0)];
    let stats = GameStats::default();
    let _ = resolve_click(&targets, &stats, Some(TargetId(1)), &points());
    assert_eq!(targets.len(), 1);
    assert_eq!(stats.score, 0);
}

// ── hit_test ──────────────────────────────────────────────────────────────────

#[test]
fn hit_test_prefers_latest_spawn() {
    let targets = vec![
        target(1, TargetKind::Standard, 100.0, 100.0),
        target(2, TargetKind::Bomb, 110.0, 100.0),
    ];
    assert_eq!(hit_test(&targets, 105.0, 100.0, 0.0), Some(TargetId(2)));
    assert_eq!(hit_test(&targets, 85.0, 100.0, 0.0), Some(TargetId(1)));
    assert_eq!(hit_test(&targets, 500.0, 500.0, 0.0), None);
}

// ── advance_targets ───────────────────────────────────────────────────────────

#[test]
fn motion_adds_velocity() {
    let field = Playfield::default();
    let t = Target { vx: 2.0, vy: -1.5, ..target(1, TargetKind::Standard, 300.0, 300.0) };
    let moved = advance_targets(&[t], &field);
    assert_eq!(moved[0].x, 302.0);
    assert_eq!(moved[0].y, 298.5);
    assert_eq!(moved[0].vx, 2.0);
    assert_eq!(moved[0].vy, -1.5);
}

#[test]
fn motion_reflects_without_clamping() {
    let field = Playfield::default();
    // Left margin is 50: stepping to 48 flips vx but keeps x at 48.
    let t = Target { vx: -3.0, ..target(1, TargetKind::Standard, 51.0, 300.0) };
    let moved = advance_targets(&[t], &field);
    assert_eq!(moved[0].x, 48.0);
    assert_eq!(moved[0].vx, 3.0);

    let back = advance_targets(&moved, &field);
    assert_eq!(back[0].x, 51.0);
    assert_eq!(back[0].vx, 3.0);
}

#[test]
fn motion_reflects_at_bottom_chrome() {
    let field = Playfield::default();
    // Bottom bound is 720 - 100 = 620.
    let t = Target { vy: 4.0, ..target(1, TargetKind::Standard, 300.0, 618.0) };
    let moved = advance_targets(&[t], &field);
    assert_eq!(moved[0].y, 622.0);
    assert_eq!(moved[0].vy, -4.0);
}

// ── sweep_expired ─────────────────────────────────────────────────────────────

fn expiring_mix() -> Vec<Target> {
    vec![
        Target { expires_at: 500, ..target(1, TargetKind::Standard, 0.0, 0.0) },
        Target { expires_at: 500, ..target(2, TargetKind::Golden, 0.0, 0.0) },
        Target { expires_at: 500, ..target(3, TargetKind::Bomb, 0.0, 0.0) },
        Target { expires_at: 900, ..target(4, TargetKind::Standard, 0.0, 0.0) },
    ]
}

#[test]
fn sweep_charges_misses_when_expiry_counts() {
    let stats = GameStats { hits: 2, current_combo: 2, ..GameStats::default() };
    let out = sweep_expired(&expiring_mix(), &stats, 500, true);
    assert_eq!(out.expired.len(), 3);
    assert_eq!(out.penalized, 2);
    assert_eq!(out.targets.len(), 1);
    assert_eq!(out.targets[0].id, TargetId(4));
    assert_eq!(out.stats.misses, 2);
    assert_eq!(out.stats.current_combo, 0);
    assert_eq!(out.stats.accuracy, 50.0);
}

#[test]
fn sweep_only_breaks_combo_when_expiry_is_free() {
    let stats = GameStats { hits: 2, current_combo: 2, ..GameStats::default() };
    let out = sweep_expired(&expiring_mix(), &stats, 500, false);
    assert_eq!(out.penalized, 2);
    assert_eq!(out.stats.misses, 0);
    assert_eq!(out.stats.current_combo, 0);
    assert_eq!(out.stats.accuracy, 100.0);
}

#[test]
fn expired_bomb_alone_costs_nothing() {
    let targets = vec![Target { expires_at: 10, ..target(1, TargetKind::Bomb, 0.0, 0.0) }];
    let stats = GameStats { current_combo: 4, ..GameStats::default() };
    let out = sweep_expired(&targets, &stats, 10, true);
    assert_eq!(out.expired.len(), 1);
    assert_eq!(out.penalized, 0);
    assert_eq!(out.stats, stats);
    assert!(out.targets.is_empty());
}

#[test]
fn sweep_before_deadline_keeps_everything() {
    let stats = GameStats::default();
    let out = sweep_expired(&expiring_mix(), &stats, 499, true);
    assert!(out.expired.is_empty());
    assert_eq!(out.targets.len(), 4);
    assert_eq!(out.stats, stats);
}

// ── countdown & limits ────────────────────────────────────────────────────────

#[test]
fn tick_clock_counts_down_and_saturates() {
    let s = GameStats::new(Some(2));
    let s = tick_clock(&s);
    assert_eq!(s.time_remaining, Some(1));
    let s = tick_clock(&tick_clock(&s));
    assert_eq!(s.time_remaining, Some(0));
    assert_eq!(tick_clock(&GameStats::default()).time_remaining, None);
}

#[test]
fn misses_win_when_both_limits_cross() {
    let tuning = Tuning::survival();
    let stats = GameStats { misses: 10, bomb_hits: 5, ..GameStats::default() };
    assert_eq!(limit_reached(&stats, &tuning), Some(EndReason::TooManyMisses));
}

#[test]
fn milestones_every_ten_hits() {
    assert!(!is_milestone(0, 10));
    assert!(!is_milestone(9, 10));
    assert!(is_milestone(10, 10));
    assert!(is_milestone(20, 10));
    assert!(!is_milestone(10, 0));
}

//! Pure game-logic functions.
//!
//! Every public function takes immutable views of the live targets and the
//! current `GameStats` and returns brand-new values.  The session swaps the
//! results in wholesale, so a callback never observes a half-updated
//! collection.

use crate::config::{Playfield, Points, Tuning};
use crate::entities::{accuracy_of, EndReason, GameStats, Target, TargetId, TargetKind};

// ── Scoring engine ────────────────────────────────────────────────────────────

/// What a single pointer press did to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickEffect {
    /// Press landed on empty space.
    Missed,
    Hit {
        id: TargetId,
        kind: TargetKind,
        points: u32,
        combo: u32,
    },
    BombHit {
        id: TargetId,
        /// Points actually deducted after flooring at zero.
        penalty: u32,
    },
    LifeCollected {
        id: TargetId,
        points: u32,
    },
    /// The target was already removed (expired or clicked); nothing changed.
    AlreadyGone { id: TargetId },
}

#[derive(Clone, Debug)]
pub struct ClickOutcome {
    pub targets: Vec<Target>,
    pub stats: GameStats,
    pub effect: ClickEffect,
}

/// Resolve a press against `clicked` (or empty space when `None`).
///
/// Bomb hits never touch accuracy: they are neither hits nor misses.
pub fn resolve_click(
    targets: &[Target],
    stats: &GameStats,
    clicked: Option<TargetId>,
    points: &Points,
) -> ClickOutcome {
    let id = match clicked {
        None => {
            let misses = stats.misses + 1;
            return ClickOutcome {
                targets: targets.to_vec(),
                stats: GameStats {
                    misses,
                    current_combo: 0,
                    accuracy: accuracy_of(stats.hits, misses),
                    ..stats.clone()
                },
                effect: ClickEffect::Missed,
            };
        }
        Some(id) => id,
    };

    let Some(target) = targets.iter().find(|t| t.id == id) else {
        return ClickOutcome {
            targets: targets.to_vec(),
            stats: stats.clone(),
            effect: ClickEffect::AlreadyGone { id },
        };
    };

    let remaining: Vec<Target> = targets.iter().filter(|t| t.id != id).cloned().collect();

    let (stats, effect) = match target.kind {
        TargetKind::Bomb => {
            let penalty = points.bomb_penalty.min(stats.score);
            (
                GameStats {
                    score: stats.score - penalty,
                    current_combo: 0,
                    bomb_hits: stats.bomb_hits + 1,
                    ..stats.clone()
                },
                ClickEffect::BombHit { id, penalty },
            )
        }
        TargetKind::Life => {
            let misses = stats.misses.saturating_sub(1);
            let combo = stats.current_combo + 1;
            (
                GameStats {
                    score: stats.score + points.life,
                    misses,
                    current_combo: combo,
                    max_combo: stats.max_combo.max(combo),
                    accuracy: accuracy_of(stats.hits, misses),
                    ..stats.clone()
                },
                ClickEffect::LifeCollected { id, points: points.life },
            )
        }
        kind @ (TargetKind::Standard | TargetKind::Golden | TargetKind::Phantom) => {
            let combo = stats.current_combo + 1;
            let hits = stats.hits + 1;
            let gained = points.base_for(kind) + points.combo_bonus_for(combo);
            (
                GameStats {
                    score: stats.score + gained,
                    hits,
                    current_combo: combo,
                    max_combo: stats.max_combo.max(combo),
                    accuracy: accuracy_of(hits, stats.misses),
                    ..stats.clone()
                },
                ClickEffect::Hit { id, kind, points: gained, combo },
            )
        }
    };

    ClickOutcome { targets: remaining, stats, effect }
}

/// Topmost target whose hit region contains `(x, y)`.
///
/// Later spawns are drawn over earlier ones, so the search runs backwards.
pub fn hit_test(targets: &[Target], x: f32, y: f32, slack: f32) -> Option<TargetId> {
    targets
        .iter()
        .rev()
        .find(|t| t.contains(x, y, slack))
        .map(|t| t.id)
}

// ── Motion integrator ─────────────────────────────────────────────────────────

/// Advance every target by one frame, reflecting velocity at the field bounds.
///
/// Positions are never clamped: a target may sit up to one step outside a
/// bound before the reflected velocity carries it back.
pub fn advance_targets(targets: &[Target], field: &Playfield) -> Vec<Target> {
    let left = field.bounce_margin;
    let right = field.width - field.bounce_margin;
    let top = field.top_chrome;
    let bottom = field.height - field.bottom_chrome;

    targets
        .iter()
        .map(|t| {
            let x = t.x + t.vx;
            let y = t.y + t.vy;
            let vx = if x < left || x > right { -t.vx } else { t.vx };
            let vy = if y < top || y > bottom { -t.vy } else { t.vy };
            Target { x, y, vx, vy, ..t.clone() }
        })
        .collect()
}

// ── Expiry sweeper ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SweepOutcome {
    pub targets: Vec<Target>,
    pub stats: GameStats,
    pub expired: Vec<Target>,
    /// How many of `expired` were penalizable kinds.
    pub penalized: u32,
}

/// Drop every target whose `expires_at <= now`.
///
/// Any penalizable expiry resets the combo (once per sweep). Misses are only
/// charged when `misses_count_on_expiry` is set, one per penalizable target.
pub fn sweep_expired(
    targets: &[Target],
    stats: &GameStats,
    now: u64,
    misses_count_on_expiry: bool,
) -> SweepOutcome {
    let (expired, live): (Vec<Target>, Vec<Target>) =
        targets.iter().cloned().partition(|t| t.is_expired(now));

    let penalized = expired
        .iter()
        .filter(|t| t.kind.penalized_on_expiry())
        .count() as u32;

    let stats = if penalized == 0 {
        stats.clone()
    } else if misses_count_on_expiry {
        let misses = stats.misses + penalized;
        GameStats {
            misses,
            current_combo: 0,
            accuracy: accuracy_of(stats.hits, misses),
            ..stats.clone()
        }
    } else {
        GameStats {
            current_combo: 0,
            ..stats.clone()
        }
    };

    SweepOutcome { targets: live, stats, expired, penalized }
}

// ── Countdown & limits ────────────────────────────────────────────────────────

/// One second off the clock. Untimed stats pass through unchanged.
pub fn tick_clock(stats: &GameStats) -> GameStats {
    GameStats {
        time_remaining: stats.time_remaining.map(|t| t.saturating_sub(1)),
        ..stats.clone()
    }
}

/// The termination threshold crossed by `stats`, misses checked first.
pub fn limit_reached(stats: &GameStats, tuning: &Tuning) -> Option<EndReason> {
    if stats.misses >= tuning.max_total_misses {
        Some(EndReason::TooManyMisses)
    } else if stats.bomb_hits >= tuning.max_bomb_hits {
        Some(EndReason::TooManyBombs)
    } else {
        None
    }
}

/// Whether the hit count just landed on a coaching milestone.
pub fn is_milestone(hits: u32, every: u32) -> bool {
    every > 0 && hits > 0 && hits % every == 0
}

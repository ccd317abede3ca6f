//! Target generator.
//!
//! Decides what kind of target appears next, where, how big, how fast and
//! for how long, all as a function of the difficulty stage. Randomness comes
//! exclusively through the injected RNG so tests can seed it.

use rand::Rng;

use crate::config::{Playfield, Ruleset, Tuning};
use crate::entities::{KindSet, Target, TargetId, TargetKind};

/// Order in which special kinds claim their slice of `[0, 1)`.
const BAND_ORDER: [TargetKind; 4] = [
    TargetKind::Golden,
    TargetKind::Life,
    TargetKind::Bomb,
    TargetKind::Phantom,
];

/// Map one uniform draw onto a kind.
///
/// Bands are laid end to end without rescaling; whatever lies past the last
/// enabled band is `Standard`. If the bands overrun 1.0 the band that crosses
/// it owns the rest of the range and `Standard` cannot occur.
pub fn pick_kind(roll: f32, stage: u32, tuning: &Tuning, enabled: KindSet) -> TargetKind {
    let mut upper = 0.0;
    for kind in BAND_ORDER {
        if !enabled.allows(kind) {
            continue;
        }
        let Some(profile) = tuning.profile(kind) else {
            continue;
        };
        upper += profile.band.at(stage).max(0.0);
        if roll < upper {
            return kind;
        }
    }
    TargetKind::Standard
}

/// Milliseconds until the next spawn after one at `score`.
pub fn spawn_interval(score: u32, tuning: &Tuning) -> u64 {
    let stage = tuning.stage_for(score);
    tuning.spawn_interval.at(stage).max(1.0) as u64
}

/// Size, lifespan (ms) and speed for `kind` at `stage`.
pub fn kind_attributes(kind: TargetKind, stage: u32, tuning: &Tuning) -> (f32, u64, f32) {
    let size = tuning.size.at(stage);
    let lifespan = tuning.lifespan.at(stage);
    let speed = tuning.speed.at(stage);

    match tuning.profile(kind) {
        None => (size, lifespan as u64, speed),
        Some(profile) => (
            profile.size.apply(size),
            profile.lifespan.apply(lifespan).max(1.0) as u64,
            speed * profile.speed_mult,
        ),
    }
}

/// Produce one target spawned at `now`, given the current score.
pub fn spawn_target(
    id: TargetId,
    now: u64,
    score: u32,
    ruleset: &Ruleset,
    tuning: &Tuning,
    field: &Playfield,
    rng: &mut impl Rng,
) -> Target {
    let stage = tuning.stage_for(score);
    let kind = pick_kind(rng.gen::<f32>(), stage, tuning, ruleset.enabled_kinds);
    let (size, lifespan, speed) = kind_attributes(kind, stage, tuning);

    let span_x = (field.width - field.padding * 2.0).max(0.0);
    let span_y = (field.height - field.top_chrome - field.bottom_chrome).max(0.0);
    let x = field.padding + rng.gen::<f32>() * span_x;
    let y = field.top_chrome + rng.gen::<f32>() * span_y;

    let vx = (rng.gen::<f32>() - 0.5) * speed * tuning.velocity_spread;
    let vy = (rng.gen::<f32>() - 0.5) * speed * tuning.velocity_spread;

    Target {
        id,
        x,
        y,
        vx,
        vy,
        size,
        kind,
        created_at: now,
        expires_at: now + lifespan,
    }
}

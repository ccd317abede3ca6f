//! Rulesets, difficulty tuning and environment-driven configuration.
//!
//! One parameterized core serves both observed game modes: an untimed
//! survival mode with a recovery ("life") target, and a 30-second time
//! attack where every unclicked target costs a miss.

use std::env;
use std::path::PathBuf;

use crate::entities::{KindSet, TargetKind};
use crate::error::ConfigError;

// ── Ruleset ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ruleset {
    pub has_timer: bool,
    /// Every penalizable target that expires unclicked adds a miss.
    pub misses_count_on_expiry: bool,
    pub enabled_kinds: KindSet,
    /// Length of a timed session. Ignored unless `has_timer`.
    pub duration_secs: u32,
}

impl Ruleset {
    pub fn survival() -> Self {
        Ruleset {
            has_timer: false,
            misses_count_on_expiry: false,
            enabled_kinds: KindSet::STANDARD | KindSet::GOLDEN | KindSet::LIFE | KindSet::BOMB,
            duration_secs: 0,
        }
    }

    pub fn timed(duration_secs: u32) -> Self {
        Ruleset {
            has_timer: true,
            misses_count_on_expiry: true,
            enabled_kinds: KindSet::STANDARD | KindSet::GOLDEN | KindSet::BOMB | KindSet::PHANTOM,
            duration_secs,
        }
    }

    pub fn initial_time(&self) -> Option<u32> {
        self.has_timer.then_some(self.duration_secs)
    }
}

// ── Difficulty curves ─────────────────────────────────────────────────────────

/// A value that moves linearly with the difficulty stage and stops at `limit`.
///
/// A negative `step` makes `limit` a floor, a positive one makes it a ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    pub base: f32,
    pub step: f32,
    pub limit: f32,
}

impl Ramp {
    pub const fn flat(value: f32) -> Self {
        Ramp { base: value, step: 0.0, limit: value }
    }

    pub fn at(&self, stage: u32) -> f32 {
        let raw = self.base + self.step * stage as f32;
        if self.step < 0.0 {
            raw.max(self.limit)
        } else {
            raw.min(self.limit)
        }
    }
}

/// How a special kind derives one attribute from the stage-scaled base value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scale {
    Relative(f32),
    Fixed(f32),
}

impl Scale {
    pub fn apply(&self, base: f32) -> f32 {
        match self {
            Scale::Relative(factor) => base * factor,
            Scale::Fixed(value) => *value,
        }
    }
}

/// Spawn profile of one non-standard kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    /// Width of this kind's slice of `[0, 1)`.
    pub band: Ramp,
    pub size: Scale,
    pub lifespan: Scale,
    pub speed_mult: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Points {
    pub standard: u32,
    pub golden: u32,
    pub phantom: u32,
    pub life: u32,
    pub bomb_penalty: u32,
    /// A bonus of `combo_bonus` is paid per `combo_every` consecutive hits.
    pub combo_every: u32,
    pub combo_bonus: u32,
}

impl Points {
    pub fn base_for(&self, kind: TargetKind) -> u32 {
        match kind {
            TargetKind::Standard => self.standard,
            TargetKind::Golden => self.golden,
            TargetKind::Phantom => self.phantom,
            TargetKind::Life => self.life,
            TargetKind::Bomb => 0,
        }
    }

    pub fn combo_bonus_for(&self, combo: u32) -> u32 {
        if self.combo_every == 0 {
            return 0;
        }
        combo / self.combo_every * self.combo_bonus
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Score needed per difficulty stage.
    pub stage_score_step: u32,
    /// Milliseconds between spawns.
    pub spawn_interval: Ramp,
    pub size: Ramp,
    /// Milliseconds a standard target stays on the field.
    pub lifespan: Ramp,
    pub speed: Ramp,
    /// Velocity components are drawn from `±speed * spread / 2`.
    pub velocity_spread: f32,
    pub golden: KindProfile,
    pub life: KindProfile,
    pub bomb: KindProfile,
    pub phantom: KindProfile,
    pub points: Points,
    pub max_total_misses: u32,
    pub max_bomb_hits: u32,
    /// A coaching line is requested every this many hits.
    pub milestone_hits: u32,
    pub sweep_interval_ms: u64,
    pub clock_interval_ms: u64,
}

impl Tuning {
    pub fn survival() -> Self {
        Tuning {
            stage_score_step: 100,
            spawn_interval: Ramp { base: 1000.0, step: -80.0, limit: 200.0 },
            size: Ramp { base: 55.0, step: -4.0, limit: 20.0 },
            lifespan: Ramp { base: 1800.0, step: -120.0, limit: 500.0 },
            speed: Ramp { base: 1.0, step: 0.5, limit: 6.0 },
            velocity_spread: 3.0,
            golden: KindProfile {
                band: Ramp::flat(0.05),
                size: Scale::Relative(0.6),
                lifespan: Scale::Relative(0.7),
                speed_mult: 1.5,
            },
            life: KindProfile {
                band: Ramp::flat(0.04),
                size: Scale::Fixed(45.0),
                lifespan: Scale::Fixed(1500.0),
                speed_mult: 1.2,
            },
            bomb: KindProfile {
                band: Ramp { base: 0.11, step: 0.03, limit: 0.4 },
                size: Scale::Fixed(50.0),
                lifespan: Scale::Fixed(2500.0),
                speed_mult: 0.5,
            },
            phantom: KindProfile {
                band: Ramp::flat(0.06),
                size: Scale::Relative(1.0),
                lifespan: Scale::Relative(1.0),
                speed_mult: 1.0,
            },
            points: Points {
                standard: 10,
                golden: 50,
                phantom: 10,
                life: 25,
                bomb_penalty: 50,
                combo_every: 5,
                combo_bonus: 5,
            },
            max_total_misses: 10,
            max_bomb_hits: 5,
            milestone_hits: 10,
            sweep_interval_ms: 100,
            clock_interval_ms: 1000,
        }
    }

    pub fn timed() -> Self {
        Tuning {
            stage_score_step: 150,
            spawn_interval: Ramp { base: 1000.0, step: -75.0, limit: 300.0 },
            size: Ramp { base: 50.0, step: -3.0, limit: 25.0 },
            lifespan: Ramp { base: 1500.0, step: -100.0, limit: 600.0 },
            speed: Ramp { base: 0.5, step: 0.8, limit: 6.0 },
            velocity_spread: 10.0,
            golden: KindProfile {
                band: Ramp { base: 0.05, step: 0.02, limit: 0.15 },
                size: Scale::Relative(0.6),
                lifespan: Scale::Relative(0.67),
                speed_mult: 1.5,
            },
            bomb: KindProfile {
                band: Ramp { base: 0.15, step: 0.05, limit: 0.4 },
                size: Scale::Fixed(60.0),
                lifespan: Scale::Fixed(2000.0),
                speed_mult: 0.7,
            },
            ..Tuning::survival()
        }
    }

    pub fn stage_for(&self, score: u32) -> u32 {
        if self.stage_score_step == 0 {
            0
        } else {
            score / self.stage_score_step
        }
    }

    pub fn profile(&self, kind: TargetKind) -> Option<&KindProfile> {
        match kind {
            TargetKind::Standard => None,
            TargetKind::Golden => Some(&self.golden),
            TargetKind::Life => Some(&self.life),
            TargetKind::Bomb => Some(&self.bomb),
            TargetKind::Phantom => Some(&self.phantom),
        }
    }

    /// Largest probability mass the enabled special kinds can ever claim.
    pub fn peak_special_mass(&self, enabled: KindSet) -> f32 {
        TargetKind::ALL
            .iter()
            .filter(|k| enabled.allows(**k))
            .filter_map(|k| self.profile(*k))
            .map(|p| p.band.base.max(p.band.limit))
            .sum()
    }
}

// ── Play field ────────────────────────────────────────────────────────────────

/// Virtual coordinate space targets live in, with the UI chrome carved out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Horizontal spawn inset.
    pub padding: f32,
    /// Reserved for the status bar.
    pub top_chrome: f32,
    pub bottom_chrome: f32,
    /// Horizontal reflection inset.
    pub bounce_margin: f32,
    /// Extra radius granted to every hit test.
    pub hit_slack: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Playfield {
            width: 1280.0,
            height: 720.0,
            padding: 60.0,
            top_chrome: 140.0,
            bottom_chrome: 100.0,
            bounce_margin: 50.0,
            hit_slack: 0.0,
        }
    }
}

// ── Coach endpoint ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct CoachConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for CoachConfig {
    fn default() -> Self {
        CoachConfig {
            endpoint: None,
            api_key: None,
            timeout_ms: 4000,
        }
    }
}

// ── Top-level configuration ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub ruleset: Ruleset,
    pub tuning: Tuning,
    pub playfield: Playfield,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub coach: CoachConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::survival()
    }
}

impl GameConfig {
    pub fn survival() -> Self {
        GameConfig {
            ruleset: Ruleset::survival(),
            tuning: Tuning::survival(),
            playfield: Playfield::default(),
            seed: None,
            data_dir: None,
            coach: CoachConfig::default(),
        }
    }

    pub fn timed() -> Self {
        GameConfig {
            ruleset: Ruleset::timed(30),
            tuning: Tuning::timed(),
            ..GameConfig::survival()
        }
    }

    /// Swap ruleset and tuning while keeping environment-derived settings.
    pub fn with_mode(&self, timed: bool) -> Self {
        let preset = if timed { GameConfig::timed() } else { GameConfig::survival() };
        let duration = if self.ruleset.duration_secs > 0 {
            self.ruleset.duration_secs
        } else {
            preset.ruleset.duration_secs
        };
        GameConfig {
            ruleset: Ruleset {
                duration_secs: duration,
                ..preset.ruleset
            },
            tuning: preset.tuning,
            ..self.clone()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `NEON_AIM_RULESET` - `survival` (default) or `timed`
    /// - `NEON_AIM_DURATION_SECS` - Length of a timed session (default: 30)
    /// - `NEON_AIM_SEED` - Fixed RNG seed
    /// - `NEON_AIM_DATA_DIR` - High score and log directory (default: platform-specific)
    /// - `NEON_AIM_COACH_ENDPOINT` - URL of the coaching text service (default: offline lines)
    /// - `NEON_AIM_COACH_API_KEY` - Bearer token sent to the coaching service
    /// - `NEON_AIM_COACH_TIMEOUT_MS` - Coaching request timeout (default: 4000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var("NEON_AIM_RULESET").ok().as_deref() {
            None | Some("survival") => GameConfig::survival(),
            Some("timed") => GameConfig::timed(),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "NEON_AIM_RULESET",
                    value: other.to_string(),
                })
            }
        };

        if let Some(secs) = read_env::<u32>("NEON_AIM_DURATION_SECS")? {
            config.ruleset.duration_secs = secs.max(1);
        }
        config.seed = read_env::<u64>("NEON_AIM_SEED")?;
        config.data_dir = env::var("NEON_AIM_DATA_DIR").ok().map(PathBuf::from);

        config.coach.endpoint = env::var("NEON_AIM_COACH_ENDPOINT").ok().filter(|s| !s.is_empty());
        config.coach.api_key = env::var("NEON_AIM_COACH_API_KEY").ok().filter(|s| !s.is_empty());
        if let Some(timeout) = read_env::<u64>("NEON_AIM_COACH_TIMEOUT_MS")? {
            config.coach.timeout_ms = timeout.max(1);
        }

        Ok(config)
    }
}

fn read_env<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

//! Session controller.
//!
//! Owns the stats, the live-target collection and every recurring schedule,
//! and moves through `Idle -> Playing -> Ended -> Idle`. All activity is
//! cooperative: the caller feeds the session clock through [`Session::advance`],
//! rendered frames through [`Session::on_frame`] and pointer presses through
//! [`Session::click`]; each call runs to completion before the next.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compute::{
    advance_targets, hit_test, is_milestone, limit_reached, resolve_click, sweep_expired,
    tick_clock, ClickEffect,
};
use crate::config::{GameConfig, Playfield};
use crate::coach::{CoachReply, CoachTrigger};
use crate::entities::{
    CoachMessage, EndReason, GameStats, SessionStatus, Target, TargetId, TargetKind,
};
use crate::high_score::HighScoreStore;
use crate::scheduler::{Activity, SessionTimers};
use crate::spawner::{spawn_interval, spawn_target};

/// Placeholder coach line shown as soon as a session starts.
pub const START_MESSAGE: &str = "SYSTEM ONLINE. Green targets repair misses.";

/// Things observers (renderer, coach notifier, logs) may react to.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    SessionStarted {
        generation: u64,
    },
    TargetSpawned {
        id: TargetId,
        kind: TargetKind,
    },
    TargetExpired {
        id: TargetId,
        kind: TargetKind,
        penalized: bool,
    },
    ClickResolved(ClickEffect),
    ClockTicked {
        remaining: u32,
    },
    MilestoneReached {
        generation: u64,
        stats: GameStats,
        targets_attempted: u32,
    },
    SessionEnded {
        generation: u64,
        reason: Option<EndReason>,
        stats: GameStats,
        targets_attempted: u32,
        new_high_score: bool,
    },
}

/// RNG seeded from `seed`, or from OS entropy when `None`.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub struct Session<R: Rng = StdRng> {
    config: GameConfig,
    status: SessionStatus,
    stats: GameStats,
    targets: Vec<Target>,
    timers: SessionTimers,
    rng: R,
    next_id: u64,
    targets_spawned: u32,
    /// Bumped on every `start` and `to_menu`; coach replies must match it.
    generation: u64,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
    coach_message: Option<CoachMessage>,
    events: Vec<GameEvent>,
}

impl<R: Rng> Session<R> {
    /// Build an idle session. The high score is read from `store` here and
    /// nowhere else; a failed read leaves it at 0.
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>, rng: R) -> Self {
        let high_score = match store.load() {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("High score unavailable, starting from 0: {}", e);
                0
            }
        };
        warn_on_band_overflow(&config);

        Session {
            stats: GameStats::new(config.ruleset.initial_time()),
            config,
            status: SessionStatus::Idle,
            targets: Vec::new(),
            timers: SessionTimers::default(),
            rng,
            next_id: 0,
            targets_spawned: 0,
            generation: 0,
            high_score,
            store,
            coach_message: None,
            events: Vec::new(),
        }
    }

    // ── Read-only views ───────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn coach_message(&self) -> Option<&CoachMessage> {
        self.coach_message.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn targets_spawned(&self) -> u32 {
        self.targets_spawned
    }

    pub fn difficulty_stage(&self) -> u32 {
        self.config.tuning.stage_for(self.stats.score)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timers(&self) -> &SessionTimers {
        &self.timers
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    /// Replace the configuration between sessions. Refused while playing.
    pub fn set_config(&mut self, config: GameConfig) -> bool {
        if self.status == SessionStatus::Playing {
            return false;
        }
        warn_on_band_overflow(&config);
        self.stats = GameStats::new(config.ruleset.initial_time());
        self.config = config;
        true
    }

    /// Resize the play field (e.g. after a terminal resize). Takes effect on
    /// the next spawn and frame.
    pub fn set_playfield(&mut self, playfield: Playfield) {
        self.config.playfield = playfield;
    }

    // ── State machine ─────────────────────────────────────────────────────────

    /// Begin a fresh session at session-clock time `now`.
    ///
    /// Valid from `Idle` and `Ended`; returns `false` (and changes nothing)
    /// while already playing.
    pub fn start(&mut self, now: u64) -> bool {
        if self.status == SessionStatus::Playing {
            return false;
        }
        self.timers.cancel_all();

        self.generation += 1;
        self.stats = GameStats::new(self.config.ruleset.initial_time());
        self.targets = Vec::new();
        self.targets_spawned = 0;
        self.status = SessionStatus::Playing;
        self.coach_message = Some(CoachMessage::neutral(START_MESSAGE));

        let tuning = &self.config.tuning;
        self.timers.spawn.arm_at(now);
        self.timers.sweep.arm_at(now + tuning.sweep_interval_ms.max(1));
        if self.config.ruleset.has_timer {
            self.timers.clock.arm_at(now + tuning.clock_interval_ms.max(1));
        }
        self.timers.frame.request();

        tracing::info!(
            "Session {} started (timed: {}, expiry misses: {})",
            self.generation,
            self.config.ruleset.has_timer,
            self.config.ruleset.misses_count_on_expiry
        );
        self.events.push(GameEvent::SessionStarted {
            generation: self.generation,
        });
        true
    }

    /// Stop the running session.
    ///
    /// Only the first call while playing has any effect; later calls (for
    /// instance a second threshold crossed in the same step) are no-ops.
    pub fn end(&mut self, reason: Option<EndReason>) -> bool {
        if self.status != SessionStatus::Playing {
            tracing::debug!("end({:?}) ignored in {:?}", reason, self.status);
            return false;
        }
        self.timers.cancel_all();
        self.status = SessionStatus::Ended;

        let new_high_score = self.stats.score > self.high_score;
        if new_high_score {
            self.high_score = self.stats.score;
            if let Err(e) = self.store.save(self.high_score) {
                tracing::warn!("Failed to persist high score {}: {}", self.high_score, e);
            }
        }

        tracing::info!(
            "Session {} ended: reason={:?} score={} hits={} misses={} bombs={}",
            self.generation,
            reason,
            self.stats.score,
            self.stats.hits,
            self.stats.misses,
            self.stats.bomb_hits
        );
        self.events.push(GameEvent::SessionEnded {
            generation: self.generation,
            reason,
            stats: self.stats.clone(),
            targets_attempted: self.targets_spawned,
            new_high_score,
        });
        true
    }

    /// Return to the menu from `Ended`. A no-op from `Idle`, refused while playing.
    pub fn to_menu(&mut self) -> bool {
        match self.status {
            SessionStatus::Playing => false,
            SessionStatus::Idle => true,
            SessionStatus::Ended => {
                self.status = SessionStatus::Idle;
                self.coach_message = None;
                self.generation += 1;
                true
            }
        }
    }

    // ── Periodic activities ───────────────────────────────────────────────────

    /// Fire every spawn, sweep and countdown deadline reached by `now`, in
    /// deadline order. Stops as soon as the session leaves `Playing`.
    pub fn advance(&mut self, now: u64) {
        while self.status == SessionStatus::Playing {
            let Some((activity, at)) = self.timers.next_due(now) else {
                break;
            };
            match activity {
                Activity::Spawn => self.run_spawn(at),
                Activity::Sweep => self.run_sweep(at),
                Activity::Clock => self.run_clock(at),
            }
        }
    }

    /// Motion step for one rendered frame. Returns `false` when no frame was
    /// pending (not playing, or the loop was cancelled).
    pub fn on_frame(&mut self) -> bool {
        if self.status != SessionStatus::Playing || !self.timers.frame.take() {
            return false;
        }
        self.targets = advance_targets(&self.targets, &self.config.playfield);
        self.timers.frame.request();
        true
    }

    fn run_spawn(&mut self, at: u64) {
        let id = TargetId(self.next_id);
        self.next_id += 1;

        let target = spawn_target(
            id,
            at,
            self.stats.score,
            &self.config.ruleset,
            &self.config.tuning,
            &self.config.playfield,
            &mut self.rng,
        );
        tracing::debug!(
            "Spawned {} {:?} size={:.0} ttl={}ms",
            id,
            target.kind,
            target.size,
            target.lifespan()
        );
        self.events.push(GameEvent::TargetSpawned { id, kind: target.kind });

        let mut targets = self.targets.clone();
        targets.push(target);
        self.targets = targets;
        self.targets_spawned += 1;

        let next = spawn_interval(self.stats.score, &self.config.tuning);
        self.timers.spawn.arm_at(at + next);
    }

    fn run_sweep(&mut self, at: u64) {
        let outcome = sweep_expired(
            &self.targets,
            &self.stats,
            at,
            self.config.ruleset.misses_count_on_expiry,
        );
        if !outcome.expired.is_empty() {
            tracing::debug!(
                "Swept {} expired target(s), {} penalized",
                outcome.expired.len(),
                outcome.penalized
            );
        }
        for target in &outcome.expired {
            self.events.push(GameEvent::TargetExpired {
                id: target.id,
                kind: target.kind,
                penalized: target.kind.penalized_on_expiry(),
            });
        }
        self.targets = outcome.targets;
        self.stats = outcome.stats;

        self.timers
            .sweep
            .arm_at(at + self.config.tuning.sweep_interval_ms.max(1));
        self.check_limits();
    }

    fn run_clock(&mut self, at: u64) {
        self.stats = tick_clock(&self.stats);
        let remaining = self.stats.time_remaining.unwrap_or(0);
        self.events.push(GameEvent::ClockTicked { remaining });

        self.timers
            .clock
            .arm_at(at + self.config.tuning.clock_interval_ms.max(1));
        if remaining == 0 {
            let _ = self.end(None);
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Resolve a press on `target` (or on empty space when `None`).
    ///
    /// Returns `None` when not playing. A press on a target that is already
    /// gone resolves to [`ClickEffect::AlreadyGone`] and changes nothing.
    pub fn click(&mut self, target: Option<TargetId>) -> Option<ClickEffect> {
        if self.status != SessionStatus::Playing {
            return None;
        }

        let outcome = resolve_click(
            &self.targets,
            &self.stats,
            target,
            &self.config.tuning.points,
        );
        self.targets = outcome.targets;
        self.stats = outcome.stats;
        let effect = outcome.effect;

        tracing::debug!("Click resolved: {:?}", effect);
        self.events.push(GameEvent::ClickResolved(effect.clone()));

        if matches!(effect, ClickEffect::Hit { .. })
            && is_milestone(self.stats.hits, self.config.tuning.milestone_hits)
        {
            self.events.push(GameEvent::MilestoneReached {
                generation: self.generation,
                stats: self.stats.clone(),
                targets_attempted: self.targets_spawned,
            });
        }

        self.check_limits();
        Some(effect)
    }

    /// Hit-test a press at play-field coordinates, then resolve it.
    pub fn click_at(&mut self, x: f32, y: f32) -> Option<ClickEffect> {
        let hit = hit_test(&self.targets, x, y, self.config.playfield.hit_slack);
        self.click(hit)
    }

    fn check_limits(&mut self) {
        if let Some(reason) = limit_reached(&self.stats, &self.config.tuning) {
            let _ = self.end(Some(reason));
        }
    }

    // ── Coaching ──────────────────────────────────────────────────────────────

    /// Show a coach reply unless it belongs to an earlier generation.
    ///
    /// Once the session has ended only the closing line may replace the
    /// message, so a slow milestone reply cannot bury the end reason.
    pub fn apply_coach_reply(&mut self, reply: CoachReply) -> bool {
        if reply.generation != self.generation || self.status == SessionStatus::Idle {
            tracing::debug!(
                "Discarding stale coach reply (generation {} != {})",
                reply.generation,
                self.generation
            );
            return false;
        }
        if self.status == SessionStatus::Ended && reply.trigger == CoachTrigger::Milestone {
            tracing::debug!("Discarding milestone coach reply after session end");
            return false;
        }
        self.coach_message = Some(reply.message);
        true
    }
}

fn warn_on_band_overflow(config: &GameConfig) {
    let mass = config.tuning.peak_special_mass(config.ruleset.enabled_kinds);
    if mass >= 1.0 {
        tracing::warn!(
            "Special target bands can reach {:.2}; standard targets will stop spawning",
            mass
        );
    }
}

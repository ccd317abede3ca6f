//! Game entity types: plain data shared by the core and the renderer.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ── Targets ───────────────────────────────────────────────────────────────────

/// Opaque identifier handed out by the session, unique for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Standard,
    /// Worth more, smaller, faster, shorter-lived.
    Golden,
    /// Repairs one accumulated miss when clicked.
    Life,
    /// Penalizes the player when clicked; harmless when left alone.
    Bomb,
    /// Translucent standard target. Scores and expires like `Standard`.
    Phantom,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::Standard,
        TargetKind::Golden,
        TargetKind::Life,
        TargetKind::Bomb,
        TargetKind::Phantom,
    ];

    /// Whether running out of time on this kind breaks the combo.
    pub fn penalized_on_expiry(self) -> bool {
        !matches!(self, TargetKind::Bomb | TargetKind::Life)
    }

    pub fn flag(self) -> KindSet {
        match self {
            TargetKind::Standard => KindSet::STANDARD,
            TargetKind::Golden => KindSet::GOLDEN,
            TargetKind::Life => KindSet::LIFE,
            TargetKind::Bomb => KindSet::BOMB,
            TargetKind::Phantom => KindSet::PHANTOM,
        }
    }
}

bitflags! {
    /// Set of target kinds a ruleset may spawn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const STANDARD = 1 << 0;
        const GOLDEN   = 1 << 1;
        const LIFE     = 1 << 2;
        const BOMB     = 1 << 3;
        const PHANTOM  = 1 << 4;
    }
}

impl KindSet {
    pub fn allows(self, kind: TargetKind) -> bool {
        self.contains(kind.flag())
    }
}

/// One clickable object on the play field.
///
/// Positions are in play-field units; `vx`/`vy` are added once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Diameter of the hit region.
    pub size: f32,
    pub kind: TargetKind,
    /// Session clock (ms) at spawn.
    pub created_at: u64,
    /// Session clock (ms) at which the target is swept away unclicked.
    pub expires_at: u64,
}

impl Target {
    pub fn lifespan(&self) -> u64 {
        self.expires_at.saturating_sub(self.created_at)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }

    /// Point-in-circle test, widened by `slack` units.
    pub fn contains(&self, x: f32, y: f32, slack: f32) -> bool {
        let r = self.size / 2.0 + slack;
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= r * r
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Mutable scoreboard owned by the session for its duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    /// Percentage in `[0, 100]`; 100 until the first shot lands or misses.
    pub accuracy: f32,
    pub current_combo: u32,
    pub max_combo: u32,
    pub bomb_hits: u32,
    /// Seconds left in the timed ruleset, `None` when untimed.
    pub time_remaining: Option<u32>,
}

impl GameStats {
    pub fn new(time_remaining: Option<u32>) -> Self {
        GameStats {
            score: 0,
            hits: 0,
            misses: 0,
            accuracy: 100.0,
            current_combo: 0,
            max_combo: 0,
            bomb_hits: 0,
            time_remaining,
        }
    }
}

impl Default for GameStats {
    fn default() -> Self {
        GameStats::new(None)
    }
}

/// `hits / (hits + misses) * 100`, or 100 when nothing has been attempted.
pub fn accuracy_of(hits: u32, misses: u32) -> f32 {
    let total = hits + misses;
    if total == 0 {
        100.0
    } else {
        hits as f32 / total as f32 * 100.0
    }
}

// ── Session status ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Playing,
    Ended,
}

/// Why a session stopped on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TooManyMisses,
    TooManyBombs,
}

impl EndReason {
    pub fn message(self) -> &'static str {
        match self {
            EndReason::TooManyMisses => "MISS LIMIT REACHED.",
            EndReason::TooManyBombs => "CRITICAL FAILURE: TOO MANY BOMBS.",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ── Coaching ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Sarcastic,
}

/// A short line of flavor text shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachMessage {
    pub text: String,
    pub sentiment: Sentiment,
}

impl CoachMessage {
    pub fn neutral(text: impl Into<String>) -> Self {
        CoachMessage {
            text: text.into(),
            sentiment: Sentiment::Neutral,
        }
    }
}

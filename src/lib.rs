//! Neon Aim: a reflex / aim trainer.
//!
//! Targets of several kinds spawn, drift around the play field and expire;
//! the player clicks them for points and combos and avoids bombs. The core is
//! deterministic and clock-agnostic: callers drive it with a millisecond
//! counter, rendered frames and pointer presses.

pub mod coach;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod high_score;
pub mod logging;
pub mod scheduler;
pub mod session;
pub mod spawner;

pub use config::GameConfig;
pub use entities::{GameStats, SessionStatus, Target, TargetId, TargetKind};
pub use session::{GameEvent, Session};

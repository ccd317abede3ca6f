//! Terminal presentation of a session.
//!
//! Draws the menu, play view and result screen from read-only session views,
//! and converts between terminal cells and play-field coordinates.  Nothing
//! here mutates game state.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use rand::Rng;

use neon_aim::compute::ClickEffect;
use neon_aim::config::Playfield;
use neon_aim::entities::{Sentiment, SessionStatus, Target, TargetKind};
use neon_aim::{GameEvent, Session};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Cyan;
const C_HUD_STAGE: Color = Color::Yellow;
const C_HUD_DAMAGE: Color = Color::Red;
const C_HUD_MISSES: Color = Color::DarkYellow;
const C_HUD_COMBO: Color = Color::Green;
const C_STANDARD: Color = Color::Cyan;
const C_GOLDEN: Color = Color::Yellow;
const C_LIFE: Color = Color::Green;
const C_BOMB: Color = Color::Red;
const C_PHANTOM: Color = Color::DarkMagenta;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps the virtual play field onto the terminal grid.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub field: Playfield,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols.max(20);
        let rows = rows.max(10);
        let base = Playfield::default();
        let cell_w = base.width / cols as f32;
        let cell_h = base.height / rows as f32;
        Viewport {
            cols,
            rows,
            field: Playfield {
                // Half a cell of slack so a press anywhere on a drawn glyph counts.
                hit_slack: cell_w.max(cell_h) / 2.0,
                ..base
            },
        }
    }

    /// Centre of terminal cell `(col, row)` in field units.
    pub fn to_field(&self, col: u16, row: u16) -> (f32, f32) {
        let x = (col as f32 + 0.5) / self.cols as f32 * self.field.width;
        let y = (row as f32 + 0.5) / self.rows as f32 * self.field.height;
        (x, y)
    }

    pub fn to_cell(&self, x: f32, y: f32) -> (u16, u16) {
        let col = (x / self.field.width * self.cols as f32).floor();
        let row = (y / self.field.height * self.rows as f32).floor();
        (
            col.clamp(0.0, self.cols.saturating_sub(1) as f32) as u16,
            row.clamp(0.0, self.rows.saturating_sub(1) as f32) as u16,
        )
    }

    /// How many columns a target of `size` units spans.
    fn span(&self, size: f32) -> u16 {
        let cell_w = self.field.width / self.cols as f32;
        ((size / cell_w).round() as u16).max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame for whatever screen the session is on.
pub fn render<W: Write, R: Rng>(
    out: &mut W,
    session: &Session<R>,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match session.status() {
        SessionStatus::Idle => draw_menu(out, session, view)?,
        SessionStatus::Playing => {
            draw_border(out, view)?;
            draw_hud(out, session, view)?;
            for target in session.targets() {
                draw_target(out, target, view)?;
            }
            draw_coach_line(out, session, view)?;
        }
        SessionStatus::Ended => {
            draw_border(out, view)?;
            draw_hud(out, session, view)?;
            draw_results(out, session, view)?;
        }
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Audio cue ─────────────────────────────────────────────────────────────────

/// Whether this frame's events deserve the terminal bell: an empty-space
/// miss, a bomb hit or a session end.
pub fn wants_bell(events: &[GameEvent]) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            GameEvent::ClickResolved(ClickEffect::Missed | ClickEffect::BombHit { .. })
                | GameEvent::SessionEnded { .. }
        )
    })
}

pub fn ring_bell<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(Print('\x07'))?;
    Ok(())
}

fn print_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (view.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

fn draw_menu<W: Write, R: Rng>(
    out: &mut W,
    session: &Session<R>,
    view: &Viewport,
) -> std::io::Result<()> {
    let cy = view.rows / 2;

    print_centered(out, view, cy.saturating_sub(7), "◉  NEON  AIM  STRIKERS  ◉", Color::Cyan)?;
    let best = format!("Best Score: {}", session.high_score());
    print_centered(out, view, cy.saturating_sub(5), &best, Color::Yellow)?;

    let legend: &[(&str, Color, &str)] = &[
        ("◉", C_STANDARD, " Standard  — 10 pts"),
        ("★", C_GOLDEN, " Golden    — 50 pts"),
        ("♥", C_LIFE, " Life      — repairs one miss"),
        ("☢", C_BOMB, " Bomb      — leave it alone"),
    ];
    let lx = (view.cols / 2).saturating_sub(14);
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        out.queue(cursor::MoveTo(lx, cy.saturating_sub(3) + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(*desc))?;
    }

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Survival   ", Color::Green, "10 misses or 5 bombs ends it"),
        ("2", "Time Attack", Color::Magenta, "30 seconds, every escape is a miss"),
    ];
    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        out.queue(cursor::MoveTo(lx, cy + 2 + i as u16))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*label))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("  {}", desc)))?;
    }

    print_centered(out, view, cy + 5, "Click targets with the mouse   Q : Quit", C_HINT)?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1, below the HUD
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2, above the coach line
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write, R: Rng>(
    out: &mut W,
    session: &Session<R>,
    view: &Viewport,
) -> std::io::Result<()> {
    let stats = session.stats();
    let tuning = &session.config().tuning;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STAGE))?;
    out.queue(Print(format!("v{}.0 ", session.difficulty_stage() + 1)))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Acc:{:>4.0}%  ",
        stats.score, stats.accuracy
    )))?;

    if let Some(secs) = stats.time_remaining {
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(format!("Time:{:>3}s  ", secs)))?;
    }

    // Right side: damage pips, misses, combo
    let pips: String = (0..tuning.max_bomb_hits)
        .map(|i| if i < stats.bomb_hits { '■' } else { '□' })
        .collect();
    let misses = format!(" Miss:{}/{} ", stats.misses, tuning.max_total_misses);
    let combo = format!("x{}", stats.current_combo);
    let width = pips.chars().count() + misses.chars().count() + combo.chars().count();
    let rx = view.cols.saturating_sub(width as u16 + 1);

    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_DAMAGE))?;
    out.queue(Print(&pips))?;
    let miss_color = if stats.misses + 3 > tuning.max_total_misses {
        Color::Red
    } else {
        C_HUD_MISSES
    };
    out.queue(style::SetForegroundColor(miss_color))?;
    out.queue(Print(&misses))?;
    out.queue(style::SetForegroundColor(C_HUD_COMBO))?;
    out.queue(Print(&combo))?;

    Ok(())
}

// ── Targets ───────────────────────────────────────────────────────────────────

fn draw_target<W: Write>(out: &mut W, target: &Target, view: &Viewport) -> std::io::Result<()> {
    let (glyph, color) = match target.kind {
        TargetKind::Standard => ("◉", C_STANDARD),
        TargetKind::Golden => ("★", C_GOLDEN),
        TargetKind::Life => ("♥", C_LIFE),
        TargetKind::Bomb => ("☢", C_BOMB),
        TargetKind::Phantom => ("○", C_PHANTOM),
    };

    let (col, row) = view.to_cell(target.x, target.y);
    // Keep sprites off the border and HUD rows.
    if row < 2 || row >= view.rows.saturating_sub(2) {
        return Ok(());
    }

    let span = view.span(target.size);
    let sprite = if span >= 3 {
        format!("({})", glyph)
    } else {
        glyph.to_string()
    };
    let half = sprite.chars().count() as u16 / 2;
    let lx = col.saturating_sub(half).max(1);

    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sprite))?;
    Ok(())
}

// ── Coach line (last row) ─────────────────────────────────────────────────────

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Neutral => Color::Cyan,
        Sentiment::Negative => Color::Red,
        Sentiment::Sarcastic => Color::Magenta,
    }
}

fn draw_coach_line<W: Write, R: Rng>(
    out: &mut W,
    session: &Session<R>,
    view: &Viewport,
) -> std::io::Result<()> {
    let hint = "Q : End";
    let row = view.rows.saturating_sub(1);

    if let Some(message) = session.coach_message() {
        let room = (view.cols as usize).saturating_sub(hint.len() + 6);
        let text: String = message.text.chars().take(room).collect();
        out.queue(cursor::MoveTo(1, row))?;
        out.queue(style::SetForegroundColor(sentiment_color(message.sentiment)))?;
        out.queue(Print(format!("» {}", text)))?;
    }

    out.queue(cursor::MoveTo(view.cols.saturating_sub(hint.len() as u16 + 1), row))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Result overlay ────────────────────────────────────────────────────────────

fn draw_results<W: Write, R: Rng>(
    out: &mut W,
    session: &Session<R>,
    view: &Viewport,
) -> std::io::Result<()> {
    let stats = session.stats();
    let new_best = stats.score > 0 && stats.score >= session.high_score();

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Magenta),
        ("║    SESSION  OVER   ║", Color::Magenta),
        ("╚════════════════════╝", Color::Magenta),
    ];
    let total_rows = lines.len() as u16 + 7;
    let start_row = (view.rows / 2).saturating_sub(total_rows / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        print_centered(out, view, start_row + i as u16, msg, *color)?;
    }

    let mut row = start_row + lines.len() as u16;
    let summary = [
        (format!("Score:     {:>6}", stats.score), Color::Cyan),
        (format!("Accuracy:  {:>5.0}%", stats.accuracy), Color::Yellow),
        (format!("Hits:      {:>6}", stats.hits), Color::White),
        (format!("Max Combo: {:>6}", stats.max_combo), Color::Green),
    ];
    for (text, color) in summary.iter() {
        print_centered(out, view, row, text, *color)?;
        row += 1;
    }

    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", session.high_score())
    } else {
        format!("Best Score: {:>6}", session.high_score())
    };
    print_centered(
        out,
        view,
        row,
        &best_line,
        if new_best { Color::Yellow } else { Color::DarkGrey },
    )?;
    row += 2;

    if let Some(message) = session.coach_message() {
        let text: String = message
            .text
            .chars()
            .take(view.cols.saturating_sub(4) as usize)
            .collect();
        print_centered(out, view, row, &text, sentiment_color(message.sentiment))?;
    }

    print_centered(
        out,
        view,
        view.rows.saturating_sub(1),
        "R - Restart  M - Menu  Q - Quit",
        Color::White,
    )?;
    Ok(())
}

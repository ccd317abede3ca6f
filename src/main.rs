mod display;

use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal, ExecutableCommand,
};

use neon_aim::coach::{provider_from_config, CoachNotifier};
use neon_aim::high_score::{default_data_dir, FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use neon_aim::session::session_rng;
use neon_aim::{logging, GameConfig, Session, SessionStatus};

use display::Viewport;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// What the frame loop wants to happen after handling one input event.
enum Flow {
    Continue,
    Quit,
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn handle_key<R: rand::Rng>(
    session: &mut Session<R>,
    key: KeyEvent,
    base: &GameConfig,
    now: u64,
) -> Flow {
    if key.kind == KeyEventKind::Release {
        return Flow::Continue;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    match (session.status(), key.code) {
        // Leaving mid-session goes through the result screen.
        (SessionStatus::Playing, KeyCode::Char('q' | 'Q') | KeyCode::Esc) => {
            let _ = session.end(None);
        }
        (SessionStatus::Idle | SessionStatus::Ended, KeyCode::Char('q' | 'Q') | KeyCode::Esc) => {
            return Flow::Quit;
        }
        (SessionStatus::Idle, KeyCode::Char(c @ ('1' | '2'))) => {
            let playfield = session.config().playfield;
            let mut config = base.with_mode(c == '2');
            config.playfield = playfield;
            let _ = session.set_config(config);
            let _ = session.start(now);
        }
        (SessionStatus::Ended, KeyCode::Char('r' | 'R')) => {
            let _ = session.start(now);
        }
        (SessionStatus::Ended, KeyCode::Char('m' | 'M')) => {
            let _ = session.to_menu();
        }
        _ => {}
    }
    Flow::Continue
}

fn handle_mouse<R: rand::Rng>(session: &mut Session<R>, mouse: MouseEvent, view: &Viewport) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    // Presses on the HUD, border or coach line are not shots.
    if mouse.row < 2 || mouse.row >= view.rows.saturating_sub(2) {
        return;
    }
    let (x, y) = view.to_field(mouse.column, mouse.row);
    let _ = session.click_at(x, y);
}

// ── Frame loop ────────────────────────────────────────────────────────────────

/// One loop serves menu, play and result screens. Each frame drains input,
/// advances the session clock, forwards coach-worthy events, applies coach
/// replies and redraws.
fn game_loop<W: Write, R: rand::Rng>(
    out: &mut W,
    session: &mut Session<R>,
    notifier: &mut CoachNotifier,
    base: &GameConfig,
    rx: &mpsc::Receiver<Event>,
) -> Result<()> {
    let epoch = Instant::now();
    let (cols, rows) = terminal::size()?;
    let mut view = Viewport::new(cols, rows);
    session.set_playfield(view.field);

    loop {
        let frame_start = Instant::now();
        let now = epoch.elapsed().as_millis() as u64;

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if let Flow::Quit = handle_key(session, key, base, now) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) if session.status() == SessionStatus::Playing => {
                    handle_mouse(session, mouse, &view);
                }
                Event::Resize(cols, rows) => {
                    view = Viewport::new(cols, rows);
                    session.set_playfield(view.field);
                }
                _ => {}
            }
        }

        if session.status() == SessionStatus::Playing {
            session.on_frame();
            session.advance(now);
        }

        let events = session.drain_events();
        if display::wants_bell(&events) {
            display::ring_bell(out)?;
        }
        notifier.submit_events(&events);
        while let Some(reply) = notifier.try_recv() {
            let _ = session.apply_coach_reply(reply);
        }

        display::render(out, session, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn data_dir(config: &GameConfig) -> Option<PathBuf> {
    config.data_dir.clone().or_else(|| default_data_dir().ok())
}

fn open_store(dir: Option<&PathBuf>) -> Box<dyn HighScoreStore> {
    match dir {
        Some(dir) => Box::new(FileHighScoreStore::new(dir)),
        None => Box::new(MemoryHighScoreStore::default()),
    }
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (config, config_error) = match GameConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    let dir = data_dir(&config);
    let _log_guard = match &dir {
        Some(dir) => Some(logging::setup_logging(dir)?),
        None => None,
    };
    if let Some(e) = config_error {
        tracing::warn!("Ignoring environment configuration: {}", e);
    }
    tracing::info!("Starting Neon Aim");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let provider = provider_from_config(&config.coach);
    let mut notifier = CoachNotifier::spawn(
        runtime.handle(),
        provider,
        Duration::from_millis(config.coach.timeout_ms),
    );

    let mut session = Session::new(config.clone(), open_store(dir.as_ref()), session_rng(config.seed));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(EnableMouseCapture)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the frame loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped, program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &mut notifier, &config, &rx);

    // A session still running at quit time still gets its high score checked.
    let _ = session.end(None);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    runtime.shutdown_timeout(Duration::from_millis(200));
    tracing::info!("Neon Aim exited");
    result
}

//! Split-screen terminal Tetris (default binary).
//!
//! Reads the configuration, loads the piece schemes, then runs the app state
//! machine at a fixed tick with a diffing framebuffer renderer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};

use splitris::app::{App, AppOptions};
use splitris::config::Config;
use splitris::core::{SchemeTable, Tuning};
use splitris::highscore::JsonHighScore;
use splitris::logger::Logger;
use splitris::term::{FrameBuffer, TerminalRenderer, Viewport};
use splitris::types::TICK_MS;

// Used when the terminal never reports key releases.
const KEY_RELEASE_TIMEOUT_MS: u32 = 150;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load(&args)?;

    // Everything that can fail for a bad setup fails before raw mode.
    let schemes = match &config.schemes {
        Some(path) => SchemeTable::load(path)
            .with_context(|| format!("load piece schemes from {}", path.display()))?,
        None => SchemeTable::builtin().context("parse built-in piece schemes")?,
    };
    let mut log = match &config.log_path {
        Some(path) => Logger::open(path)?,
        None => Logger::disabled(),
    };
    log.info("Main", format_args!("{:?}", config));
    log.info(
        "Main",
        match &config.schemes {
            Some(path) => format!("schemes: {}", path.display()),
            None => "schemes: built-in".to_string(),
        },
    );
    let high_scores = JsonHighScore::open(&config.high_score_path);

    let mut term = TerminalRenderer::new();
    term.enter(true)?;
    let key_release_timeout_ms = if term.releases_enabled() {
        None
    } else {
        Some(KEY_RELEASE_TIMEOUT_MS)
    };

    let options = AppOptions {
        players: config.players,
        seed: config.seed,
        tuning: Tuning::default(),
        mute: config.mute,
        key_release_timeout_ms,
    };
    let mut app = App::new(Arc::new(schemes), options, high_scores, log);

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        app.log_mut().warn("Main", format_args!("{:#}", e));
    }
    app.log_mut().info("Main", "exit");
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App<JsonHighScore>) -> Result<()> {
    let mut fb = FrameBuffer::new(0, 0);
    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    while !app.should_exit() {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        app.render(&mut fb, Viewport::new(w, h));
        term.draw_swap(&mut fb)?;
        if app.take_bell() {
            term.bell()?;
        }

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            app.update(TICK_MS);
        }
    }
    Ok(())
}

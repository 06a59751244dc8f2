//! Host-level flow: menus, a match played to the end, results and the
//! persisted high score.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use splitris::app::{App, AppOptions, AppState, StateKind};
use splitris::core::{HighScoreStore, SchemeTable, Tuning};
use splitris::highscore::JsonHighScore;
use splitris::logger::Logger;
use splitris::term::{FrameBuffer, Viewport};
use splitris::types::TICK_MS;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("splitris-host-{}-{}", std::process::id(), name))
}

fn new_app(players: usize, store: JsonHighScore, log: Logger) -> App<JsonHighScore> {
    let options = AppOptions {
        players,
        seed: Some(2024),
        tuning: Tuning::default(),
        mute: false,
        key_release_timeout_ms: None,
    };
    App::new(Arc::new(SchemeTable::builtin().unwrap()), options, store, log)
}

fn key(app: &mut App<JsonHighScore>, code: KeyCode, kind: KeyEventKind) {
    app.handle_key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind));
}

fn tap(app: &mut App<JsonHighScore>, code: KeyCode) {
    key(app, code, KeyEventKind::Press);
    app.update(TICK_MS);
    key(app, code, KeyEventKind::Release);
}

#[test]
fn single_player_match_runs_to_results() {
    let hs_path = temp_path("hs.json");
    let log_path = temp_path("run.log");
    let _ = std::fs::remove_file(&hs_path);
    let _ = std::fs::remove_file(&log_path);

    let mut app = new_app(1, JsonHighScore::open(&hs_path), Logger::open(&log_path).unwrap());
    key(&mut app, KeyCode::Enter, KeyEventKind::Press);
    key(&mut app, KeyCode::Enter, KeyEventKind::Press);
    assert_eq!(app.kind(), StateKind::Playing);

    // Hard drop in place until the stack reaches the top.
    let mut frames = 0;
    while app.kind() == StateKind::Playing {
        tap(&mut app, KeyCode::Char('w'));
        frames += 1;
        assert!(frames < 5000, "match never ended");
    }
    assert_eq!(app.kind(), StateKind::Results);
    assert!(app.take_bell(), "game over rings the bell");

    let AppState::Results(results) = app.state() else {
        panic!("expected results");
    };
    assert_eq!(results.standings.len(), 1);
    let score = results.standings[0].score;
    assert_eq!(results.high_score, Some(score));

    let mut reopened = JsonHighScore::open(&hs_path);
    assert_eq!(reopened.get_high_score(), score);

    let mut fb = FrameBuffer::new(80, 24);
    app.render(&mut fb, Viewport::new(80, 24));
    let text: String = (0..24).map(|y| fb.row_text(y)).collect();
    assert!(text.contains("RESULTS"));

    key(&mut app, KeyCode::Enter, KeyEventKind::Press);
    assert_eq!(app.kind(), StateKind::Menu);
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_exit());
    drop(app);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("[App] Entering Tetris"));
    assert!(log.contains("[App] Exiting Tetris"));
    assert!(log.contains("[Game] P1 game over"));

    let _ = std::fs::remove_file(&hs_path);
    let _ = std::fs::remove_file(&log_path);
}

#[test]
fn four_player_match_renders_side_by_side() {
    let mut app = new_app(4, JsonHighScore::open(temp_path("unused.json")), Logger::disabled());
    key(&mut app, KeyCode::Enter, KeyEventKind::Press);
    key(&mut app, KeyCode::Enter, KeyEventKind::Press);

    let AppState::Playing(game) = app.state() else {
        panic!("expected a match");
    };
    assert_eq!(game.players().len(), 4);

    // Each layout reaches only its own player.
    for (i, code) in [
        KeyCode::Char('a'),
        KeyCode::Left,
        KeyCode::Char('j'),
        KeyCode::Char('4'),
    ]
    .into_iter()
    .enumerate()
    {
        let before = match app.state() {
            AppState::Playing(game) => game.players()[i].session.piece().position(),
            _ => unreachable!(),
        };
        tap(&mut app, code);
        let after = match app.state() {
            AppState::Playing(game) => game.players()[i].session.piece().position(),
            _ => unreachable!(),
        };
        assert_eq!(after.0, before.0 - 1, "player {}", i + 1);
    }

    let mut fb = FrameBuffer::new(160, 30);
    app.render(&mut fb, Viewport::new(160, 30));
    let text: String = (0..30).map(|y| fb.row_text(y)).collect();
    for name in ["P1", "P2", "P3", "P4"] {
        assert!(text.contains(name));
    }

    // End forces the results screen; multiplayer never touches the record.
    key(&mut app, KeyCode::End, KeyEventKind::Press);
    assert_eq!(app.kind(), StateKind::Results);
}

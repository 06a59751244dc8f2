//! Screen state machine of the host.
//!
//! [`AppState`] holds the data of the active screen; which screen follows
//! which is decided by [`next_state`] alone. The app reacts to key events and
//! frame ticks and paints into a framebuffer, it never touches the terminal.

pub mod play;
pub mod transition;

use std::sync::Arc;

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::core::{record_high_score, HighScoreStore, SchemeTable, Tuning};
use crate::input::{host_action, menu_key, should_quit, HostAction, InputRouter, KeyMap, MenuKey};
use crate::logger::Logger;
use crate::term::menu_view::{render_menu, render_players_select, render_results, render_title};
use crate::term::{BellAudio, FrameBuffer, GameView, ResultRow, Viewport};
use crate::types::{Command, MAX_PLAYERS};

pub use play::{lock_message, Match, PlayerSlot};
pub use transition::{next_state, AppEvent, StateKind};

pub const MENU_ITEMS: [&str; 3] = ["Play", "Players", "Quit"];

/// One line of the final standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub name: &'static str,
    pub score: u32,
    pub lines: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Results {
    pub standings: Vec<Standing>,
    /// Stored high score, shown for single-player matches.
    pub high_score: Option<u32>,
    pub new_record: bool,
}

#[derive(Debug, Clone)]
pub enum AppState {
    Title,
    Menu { selected: usize },
    PlayersSelect,
    Playing(Match),
    Results(Results),
    Exit,
}

impl AppState {
    pub fn kind(&self) -> StateKind {
        match self {
            AppState::Title => StateKind::Title,
            AppState::Menu { .. } => StateKind::Menu,
            AppState::PlayersSelect => StateKind::PlayersSelect,
            AppState::Playing(_) => StateKind::Playing,
            AppState::Results(_) => StateKind::Results,
            AppState::Exit => StateKind::Exit,
        }
    }
}

/// Fixed inputs of an [`App`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub players: usize,
    pub seed: Option<u32>,
    pub tuning: Tuning,
    pub mute: bool,
    /// `None` when the terminal reports key releases.
    pub key_release_timeout_ms: Option<u32>,
}

pub struct App<H: HighScoreStore> {
    state: AppState,
    players: usize,
    seed: Option<u32>,
    tuning: Tuning,
    schemes: Arc<SchemeTable>,
    high_scores: H,
    high_score: u32,
    inputs: InputRouter,
    key_release_timeout_ms: Option<u32>,
    audio: BellAudio,
    view: GameView,
    log: Logger,
}

impl<H: HighScoreStore> App<H> {
    pub fn new(schemes: Arc<SchemeTable>, options: AppOptions, mut high_scores: H, log: Logger) -> Self {
        let high_score = high_scores.get_high_score();
        let players = options.players.clamp(1, MAX_PLAYERS);
        let mut app = Self {
            state: AppState::Title,
            players,
            seed: options.seed,
            tuning: options.tuning,
            schemes,
            high_scores,
            high_score,
            inputs: InputRouter::new(players, options.key_release_timeout_ms),
            key_release_timeout_ms: options.key_release_timeout_ms,
            audio: BellAudio::new(options.mute),
            view: GameView::default(),
            log,
        };
        app.log.info("App", format_args!("Entering {}", StateKind::Title.as_str()));
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn should_exit(&self) -> bool {
        matches!(self.state, AppState::Exit)
    }

    pub fn high_scores(&self) -> &H {
        &self.high_scores
    }

    pub fn log_mut(&mut self) -> &mut Logger {
        &mut self.log
    }

    /// Whether the terminal bell should ring; clears the request.
    pub fn take_bell(&mut self) -> bool {
        self.audio.take_bell()
    }

    /// Apply `event`; ignored when the transition table has no entry.
    pub fn dispatch(&mut self, event: AppEvent) -> bool {
        let from = self.state.kind();
        let Some(to) = next_state(from, event) else {
            return false;
        };

        let old = std::mem::replace(&mut self.state, AppState::Exit);
        self.log.info("App", format_args!("Exiting {}", from.as_str()));
        self.state = self.enter(to, old);
        self.log.info("App", format_args!("Entering {}", to.as_str()));
        true
    }

    fn enter(&mut self, to: StateKind, old: AppState) -> AppState {
        match to {
            StateKind::Title => {
                self.high_score = self.high_scores.get_high_score();
                AppState::Title
            }
            StateKind::Menu => AppState::Menu { selected: 0 },
            StateKind::PlayersSelect => AppState::PlayersSelect,
            StateKind::Playing => {
                let seed = self.seed.unwrap_or_else(rand::random);
                self.inputs = InputRouter::new(self.players, self.key_release_timeout_ms);
                self.log.info(
                    "Game",
                    format_args!("new match: players {} seed {}", self.players, seed),
                );
                AppState::Playing(Match::new(&self.schemes, self.tuning, self.players, seed))
            }
            StateKind::Results => match old {
                AppState::Playing(game) => AppState::Results(self.finish(&game)),
                _ => AppState::Results(Results {
                    standings: Vec::new(),
                    high_score: None,
                    new_record: false,
                }),
            },
            StateKind::Exit => AppState::Exit,
        }
    }

    fn finish(&mut self, game: &Match) -> Results {
        let standings: Vec<Standing> = game
            .players()
            .iter()
            .map(|slot| Standing {
                name: slot.name,
                score: slot.session.score(),
                lines: slot.session.lines(),
            })
            .collect();

        let mut results = Results {
            standings,
            high_score: None,
            new_record: false,
        };
        if let [only] = results.standings.as_slice() {
            let score = only.score;
            match record_high_score(&mut self.high_scores, score) {
                Ok(new_record) => {
                    if new_record {
                        self.log.info("HighScore", format_args!("new high score {}", score));
                    }
                    results.new_record = new_record;
                }
                Err(e) => self.log.warn("HighScore", format_args!("write failed: {}", e)),
            }
            self.high_score = self.high_scores.get_high_score().max(score);
            results.high_score = Some(self.high_score);
        }
        results
    }

    /// React to one terminal key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if let AppState::Playing(game) = &mut self.state {
            if key.kind == KeyEventKind::Release {
                self.inputs.handle_key_release(key.code);
                return;
            }
            match host_action(key) {
                Some(HostAction::Quit) => {
                    self.dispatch(AppEvent::Quit);
                }
                Some(HostAction::EndMatch) => {
                    self.dispatch(AppEvent::EndMatch);
                }
                Some(HostAction::Pause) => {
                    let paused = game.toggle_pause();
                    self.inputs.reset();
                    self.log.info("Game", if paused { "paused" } else { "resumed" });
                }
                Some(HostAction::Mute) => {
                    let muted = self.audio.toggle_mute();
                    self.log.info("Audio", if muted { "muted" } else { "unmuted" });
                }
                None => {
                    if !game.paused() {
                        self.inputs.handle_key_press(key.code);
                    }
                }
            }
            return;
        }

        if key.kind == KeyEventKind::Release {
            return;
        }
        if should_quit(key) {
            self.dispatch(AppEvent::Quit);
            return;
        }
        let Some(menu) = menu_key(key) else {
            return;
        };

        match &mut self.state {
            AppState::Title => match menu {
                MenuKey::Confirm => {
                    self.dispatch(AppEvent::Confirm);
                }
                MenuKey::Back => {
                    self.dispatch(AppEvent::Back);
                }
                _ => {}
            },
            AppState::Menu { selected } => match menu {
                MenuKey::Up => *selected = (*selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len(),
                MenuKey::Down => *selected = (*selected + 1) % MENU_ITEMS.len(),
                MenuKey::Confirm => {
                    let event = match *selected {
                        0 => AppEvent::StartMatch,
                        1 => AppEvent::ChoosePlayers,
                        _ => AppEvent::Quit,
                    };
                    self.dispatch(event);
                }
                MenuKey::Back => {
                    self.dispatch(AppEvent::Back);
                }
                _ => {}
            },
            AppState::PlayersSelect => match menu {
                MenuKey::Left | MenuKey::Down => self.players = (self.players - 1).max(1),
                MenuKey::Right | MenuKey::Up => self.players = (self.players + 1).min(MAX_PLAYERS),
                MenuKey::Confirm => {
                    self.dispatch(AppEvent::Confirm);
                }
                MenuKey::Back => {
                    self.dispatch(AppEvent::Back);
                }
            },
            AppState::Results(_) => match menu {
                MenuKey::Confirm => {
                    self.dispatch(AppEvent::Confirm);
                }
                MenuKey::Back => {
                    self.dispatch(AppEvent::Back);
                }
                _ => {}
            },
            AppState::Playing(_) | AppState::Exit => {}
        }
    }

    /// Advance one frame of `dt_ms`.
    pub fn update(&mut self, dt_ms: u32) {
        let AppState::Playing(game) = &mut self.state else {
            return;
        };
        let done = game.tick(&self.inputs, &mut self.audio, dt_ms, &mut self.log);
        self.inputs.end_frame(dt_ms);
        if done {
            self.dispatch(AppEvent::AllGameOver);
        }
    }

    /// Paint the active screen.
    pub fn render(&self, fb: &mut FrameBuffer, viewport: Viewport) {
        match &self.state {
            AppState::Title => render_title(fb, viewport, self.high_score),
            AppState::Menu { selected } => render_menu(fb, viewport, &MENU_ITEMS, *selected),
            AppState::PlayersSelect => {
                let controls: Vec<String> = (0..MAX_PLAYERS)
                    .filter_map(|i| KeyMap::for_player(i).map(|map| (i, map)))
                    .map(|(i, map)| controls_line(i, map))
                    .collect();
                render_players_select(fb, viewport, self.players, &controls);
            }
            AppState::Playing(game) => {
                let panels = game.panels();
                self.view.render_into(&panels, game.paused(), viewport, fb);
            }
            AppState::Results(results) => {
                let rows: Vec<ResultRow<'_>> = results
                    .standings
                    .iter()
                    .map(|s| ResultRow {
                        name: s.name,
                        score: s.score,
                        lines: s.lines,
                    })
                    .collect();
                render_results(fb, viewport, &rows, results.high_score, results.new_record);
            }
            AppState::Exit => {}
        }
    }
}

fn controls_line(index: usize, map: &KeyMap) -> String {
    format!(
        "{}  move {}/{}  soft {}  drop {}  rotate {}/{}  hold {}",
        play::PLAYER_NAMES[index],
        map.label(Command::MoveLeft),
        map.label(Command::MoveRight),
        map.label(Command::SoftDrop),
        map.label(Command::HardDrop),
        map.label(Command::RotateCcw),
        map.label(Command::RotateCw),
        map.label(Command::Hold),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryHighScore;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app(players: usize, high_score: MemoryHighScore) -> App<MemoryHighScore> {
        let options = AppOptions {
            players,
            seed: Some(5),
            tuning: Tuning::default(),
            mute: true,
            key_release_timeout_ms: None,
        };
        App::new(
            Arc::new(SchemeTable::builtin().unwrap()),
            options,
            high_score,
            Logger::disabled(),
        )
    }

    fn press(app: &mut App<MemoryHighScore>, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
    }

    fn start_match(app: &mut App<MemoryHighScore>) {
        press(app, KeyCode::Enter);
        assert_eq!(app.kind(), StateKind::Menu);
        press(app, KeyCode::Enter);
        assert_eq!(app.kind(), StateKind::Playing);
    }

    fn game(app: &App<MemoryHighScore>) -> &Match {
        match app.state() {
            AppState::Playing(game) => game,
            other => panic!("not playing: {:?}", other.kind()),
        }
    }

    #[test]
    fn menu_navigation() {
        let mut app = app(1, MemoryHighScore::new(0));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.kind(), StateKind::PlayersSelect);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.players(), 4);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.players(), 3);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.kind(), StateKind::Menu);

        press(&mut app, KeyCode::Enter);
        assert_eq!(game(&app).players().len(), 3);
    }

    #[test]
    fn menu_quit_and_ctrl_c() {
        let mut app = app(1, MemoryHighScore::new(0));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert!(app.should_exit());

        let mut app = self::app(1, MemoryHighScore::new(0));
        start_match(&mut app);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_exit());
    }

    #[test]
    fn keys_drive_the_right_player() {
        let mut app = app(2, MemoryHighScore::new(0));
        start_match(&mut app);
        let before = game(&app).players()[1].session.piece().position();

        press(&mut app, KeyCode::Left);
        app.update(16);

        let after = game(&app).players()[1].session.piece().position();
        assert_eq!(after.0, before.0 - 1);
        assert_eq!(game(&app).players()[0].session.piece().position(), before);
    }

    #[test]
    fn pause_stops_the_match() {
        let mut app = app(1, MemoryHighScore::new(0));
        start_match(&mut app);
        press(&mut app, KeyCode::Char('p'));
        assert!(game(&app).paused());

        let before = game(&app).players()[0].session.piece().position();
        press(&mut app, KeyCode::Char('a'));
        for _ in 0..100 {
            app.update(16);
        }
        assert_eq!(game(&app).players()[0].session.piece().position(), before);

        press(&mut app, KeyCode::Char('p'));
        assert!(!game(&app).paused());
    }

    #[test]
    fn end_match_records_high_score() {
        let mut app = app(1, MemoryHighScore::new(0));
        start_match(&mut app);
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('w'));
            app.update(16);
            app.handle_key(KeyEvent::new_with_kind(
                KeyCode::Char('w'),
                KeyModifiers::NONE,
                KeyEventKind::Release,
            ));
        }
        assert_eq!(game(&app).players()[0].session.pieces_locked(), 3);

        press(&mut app, KeyCode::End);
        let AppState::Results(results) = app.state() else {
            panic!("expected results");
        };
        assert_eq!(results.standings.len(), 1);
        assert_eq!(results.standings[0].score, 0);
        assert!(!results.new_record);
        assert_eq!(results.high_score, Some(0));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.kind(), StateKind::Menu);
    }

    #[test]
    fn high_score_write_failure_is_not_fatal() {
        let mut store = MemoryHighScore::new(0);
        store.fail_writes = true;
        let mut app = app(1, store);
        start_match(&mut app);

        let AppState::Playing(running) = &mut app.state else {
            unreachable!();
        };
        // Leave exactly the landing cells of the active piece open in the
        // bottom row, so the hard drop clears it.
        let session = &mut running.players_mut()[0].session;
        let mut dropped = session.piece().clone();
        dropped.drop(session.field());
        let landing: Vec<(i8, i8)> = dropped.cells().collect();
        for x in 0..10 {
            if !landing.contains(&(x, 19)) {
                session.field_mut().add_block(x, 19, crate::types::PieceKind::J);
            }
        }
        press(&mut app, KeyCode::Char('w'));
        app.update(16);
        assert_eq!(game(&app).players()[0].session.lines(), 1);

        press(&mut app, KeyCode::Esc);
        let AppState::Results(results) = app.state() else {
            panic!("expected results");
        };
        assert_eq!(results.standings[0].score, 1000);
        assert!(!results.new_record);
        assert_eq!(app.high_scores().score, 0);
    }

    #[test]
    fn multiplayer_results_skip_high_score() {
        let mut app = app(2, MemoryHighScore::new(10));
        start_match(&mut app);
        press(&mut app, KeyCode::End);
        let AppState::Results(results) = app.state() else {
            panic!("expected results");
        };
        assert_eq!(results.standings.len(), 2);
        assert_eq!(results.high_score, None);
    }

    #[test]
    fn every_screen_renders() {
        let mut app = app(2, MemoryHighScore::new(0));
        let mut fb = FrameBuffer::new(100, 30);
        let vp = Viewport::new(100, 30);
        app.render(&mut fb, vp);
        press(&mut app, KeyCode::Enter);
        app.render(&mut fb, vp);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        app.render(&mut fb, vp);
        let text: String = (0..30).map(|y| fb.row_text(y)).collect();
        assert!(text.contains("P2  move Left/Right"));
    }
}

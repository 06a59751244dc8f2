//! A running match: one to four independent sessions advanced in lockstep.

use std::sync::Arc;

use crate::core::{AudioSink, LockEvent, SchemeTable, Session, Tuning};
use crate::input::InputRouter;
use crate::logger::Logger;
use crate::term::PlayerPanel;
use crate::types::GAME_OVER_GRACE_MS;

/// How long a lock message stays on the side panel.
pub const MESSAGE_MS: u32 = 1200;

pub const PLAYER_NAMES: [&str; 4] = ["P1", "P2", "P3", "P4"];

#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub name: &'static str,
    pub session: Session,
    message: Option<(String, u32)>,
    reported_game_over: bool,
}

impl PlayerSlot {
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }
}

/// Side-panel text for a lock, if it is worth one.
pub fn lock_message(event: &LockEvent) -> Option<String> {
    if event.tetris {
        return Some("Tetris!".to_string());
    }
    if event.combo >= 2 {
        return Some(format!("Combo x{}", event.combo));
    }
    match event.lines_cleared {
        1 => Some("Single!".to_string()),
        2 => Some("Double!".to_string()),
        3 => Some("Triple!".to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Match {
    players: Vec<PlayerSlot>,
    paused: bool,
    /// Milliseconds since the last session ended.
    grace_ms: Option<u32>,
    seed: u32,
}

impl Match {
    /// Every player gets the same seed, so the piece sequence is shared.
    pub fn new(schemes: &Arc<SchemeTable>, tuning: Tuning, players: usize, seed: u32) -> Self {
        let players = PLAYER_NAMES
            .iter()
            .take(players.max(1))
            .map(|&name| PlayerSlot {
                name,
                session: Session::new(Arc::clone(schemes), tuning, seed),
                message: None,
                reported_game_over: false,
            })
            .collect();
        Self {
            players,
            paused: false,
            grace_ms: None,
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn players(&self) -> &[PlayerSlot] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [PlayerSlot] {
        &mut self.players
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn all_game_over(&self) -> bool {
        self.players.iter().all(|p| p.session.game_over())
    }

    /// Advance one frame. Returns true once every session has been over for
    /// the grace period.
    pub fn tick<A>(&mut self, inputs: &InputRouter, audio: &mut A, dt_ms: u32, log: &mut Logger) -> bool
    where
        A: AudioSink + ?Sized,
    {
        if self.paused {
            return false;
        }

        for (i, slot) in self.players.iter_mut().enumerate() {
            if let Some(input) = inputs.player(i) {
                slot.session.handle_input(input, audio);
            }
            slot.session.do_logic(dt_ms, audio);

            if let Some(event) = slot.session.take_last_event() {
                if let Some(text) = lock_message(&event) {
                    slot.message = Some((text, MESSAGE_MS));
                }
            } else if let Some((_, left)) = slot.message.as_mut() {
                *left = left.saturating_sub(dt_ms);
                if *left == 0 {
                    slot.message = None;
                }
            }

            if slot.session.game_over() && !slot.reported_game_over {
                slot.reported_game_over = true;
                log.info(
                    "Game",
                    format_args!(
                        "{} game over: score {} lines {} pieces {}",
                        slot.name,
                        slot.session.score(),
                        slot.session.lines(),
                        slot.session.pieces_locked()
                    ),
                );
            }
        }

        if !self.all_game_over() {
            return false;
        }
        let elapsed = self.grace_ms.map_or(0, |ms| ms.saturating_add(dt_ms));
        self.grace_ms = Some(elapsed);
        elapsed >= GAME_OVER_GRACE_MS
    }

    pub fn panels(&self) -> Vec<PlayerPanel<'_>> {
        self.players
            .iter()
            .map(|slot| PlayerPanel {
                name: slot.name,
                session: &slot.session,
                message: slot.message(),
            })
            .collect()
    }
}

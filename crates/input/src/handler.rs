//! Pressed/held tracking for terminal environments.
//!
//! Every key press produces exactly one `pressed` edge; OS key repeat only
//! refreshes the held state. Terminals without release events are handled by
//! a timeout: a key not seen for `key_release_timeout_ms` counts as released.
//! Time is passed in by the frame loop rather than read from a clock.

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;
use splitris_core::InputSource;

use crate::map::KeyMap;
use crate::types::{Command, MAX_PLAYERS};

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers auto-repeat.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Input state of one player.
#[derive(Debug, Clone)]
pub struct PlayerInput {
    keymap: KeyMap,
    pressed: [bool; 7],
    /// Milliseconds since the key was last seen, `None` when up.
    held_age_ms: [Option<u32>; 7],
    key_release_timeout_ms: Option<u32>,
}

impl PlayerInput {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            pressed: [false; 7],
            held_age_ms: [None; 7],
            key_release_timeout_ms: Some(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    /// `None` disables the timeout (the terminal reports releases).
    pub fn with_key_release_timeout_ms(mut self, timeout_ms: Option<u32>) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Record a key-down (or an OS repeat of it). Returns the mapped command.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<Command> {
        let command = self.keymap.command(code)?;
        let i = command.index();
        if self.held_age_ms[i].is_none() {
            self.pressed[i] = true;
        }
        self.held_age_ms[i] = Some(0);
        Some(command)
    }

    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<Command> {
        let command = self.keymap.command(code)?;
        self.held_age_ms[command.index()] = None;
        Some(command)
    }

    /// Close the frame: clear edges and age held keys by `elapsed_ms`.
    pub fn end_frame(&mut self, elapsed_ms: u32) {
        self.pressed = [false; 7];
        for age in self.held_age_ms.iter_mut() {
            if let Some(ms) = age {
                let next = ms.saturating_add(elapsed_ms);
                *age = match self.key_release_timeout_ms {
                    Some(timeout) if next > timeout => None,
                    _ => Some(next),
                };
            }
        }
    }

    pub fn reset(&mut self) {
        self.pressed = [false; 7];
        self.held_age_ms = [None; 7];
    }
}

impl InputSource for PlayerInput {
    fn pressed(&self, command: Command) -> bool {
        self.pressed[command.index()]
    }

    fn held(&self, command: Command) -> bool {
        self.held_age_ms[command.index()].is_some()
    }
}

/// Routes key events to the player whose layout binds them.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    players: ArrayVec<PlayerInput, MAX_PLAYERS>,
}

impl InputRouter {
    /// Inputs for `players` players using the default layouts.
    pub fn new(players: usize, key_release_timeout_ms: Option<u32>) -> Self {
        let players = (0..players.min(MAX_PLAYERS))
            .filter_map(KeyMap::for_player)
            .map(|map| PlayerInput::new(*map).with_key_release_timeout_ms(key_release_timeout_ms))
            .collect();
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, index: usize) -> Option<&PlayerInput> {
        self.players.get(index)
    }

    /// Returns the player index and command the key belongs to.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<(usize, Command)> {
        self.players
            .iter_mut()
            .enumerate()
            .find_map(|(i, p)| p.handle_key_press(code).map(|c| (i, c)))
    }

    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<(usize, Command)> {
        self.players
            .iter_mut()
            .enumerate()
            .find_map(|(i, p)| p.handle_key_release(code).map(|c| (i, c)))
    }

    pub fn end_frame(&mut self, elapsed_ms: u32) {
        for player in self.players.iter_mut() {
            player.end_frame(elapsed_ms);
        }
    }

    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.reset();
        }
    }
}

//! Key mapping from terminal events to player commands and host actions.

use crate::types::{Command, MAX_PLAYERS};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The seven command bindings of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    bindings: [(KeyCode, Command); 7],
}

const fn bindings(
    left: KeyCode,
    right: KeyCode,
    soft: KeyCode,
    hard: KeyCode,
    ccw: KeyCode,
    cw: KeyCode,
    hold: KeyCode,
) -> KeyMap {
    KeyMap {
        bindings: [
            (left, Command::MoveLeft),
            (right, Command::MoveRight),
            (soft, Command::SoftDrop),
            (hard, Command::HardDrop),
            (ccw, Command::RotateCcw),
            (cw, Command::RotateCw),
            (hold, Command::Hold),
        ],
    }
}

/// Default layouts, one per split-screen slot.
pub const PLAYER_KEYMAPS: [KeyMap; MAX_PLAYERS] = [
    bindings(
        KeyCode::Char('a'),
        KeyCode::Char('d'),
        KeyCode::Char('s'),
        KeyCode::Char('w'),
        KeyCode::Char('q'),
        KeyCode::Char('e'),
        KeyCode::Char(' '),
    ),
    bindings(
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Down,
        KeyCode::Up,
        KeyCode::Char(','),
        KeyCode::Char('.'),
        KeyCode::Enter,
    ),
    bindings(
        KeyCode::Char('j'),
        KeyCode::Char('l'),
        KeyCode::Char('k'),
        KeyCode::Char('i'),
        KeyCode::Char('u'),
        KeyCode::Char('o'),
        KeyCode::Char('h'),
    ),
    bindings(
        KeyCode::Char('4'),
        KeyCode::Char('6'),
        KeyCode::Char('5'),
        KeyCode::Char('8'),
        KeyCode::Char('7'),
        KeyCode::Char('9'),
        KeyCode::Char('0'),
    ),
];

/// Letters are matched case-insensitively (Shift or Caps Lock held).
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl KeyMap {
    /// Layout of player `index` (0-based).
    pub fn for_player(index: usize) -> Option<&'static KeyMap> {
        PLAYER_KEYMAPS.get(index)
    }

    pub fn command(&self, code: KeyCode) -> Option<Command> {
        let code = normalize(code);
        self.bindings
            .iter()
            .find(|(key, _)| *key == code)
            .map(|&(_, command)| command)
    }

    pub fn key_for(&self, command: Command) -> KeyCode {
        self.bindings
            .iter()
            .find(|(_, c)| *c == command)
            .map(|&(key, _)| key)
            .unwrap_or(KeyCode::Null)
    }

    /// Short printable name of the key bound to `command`.
    pub fn label(&self, command: Command) -> String {
        key_label(self.key_for(command))
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        other => format!("{:?}", other),
    }
}

/// Keys that act on the whole match rather than one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Pause,
    Mute,
    EndMatch,
    Quit,
}

pub fn host_action(key: KeyEvent) -> Option<HostAction> {
    if should_quit(key) {
        return Some(HostAction::Quit);
    }
    match normalize(key.code) {
        KeyCode::Char('p') => Some(HostAction::Pause),
        KeyCode::Char('m') => Some(HostAction::Mute),
        KeyCode::Esc | KeyCode::End => Some(HostAction::EndMatch),
        _ => None,
    }
}

/// Navigation on the title, menu and results screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
}

pub fn menu_key(key: KeyEvent) -> Option<MenuKey> {
    match normalize(key.code) {
        KeyCode::Up | KeyCode::Char('w') => Some(MenuKey::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(MenuKey::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(MenuKey::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(MenuKey::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(MenuKey::Confirm),
        KeyCode::Esc | KeyCode::Backspace => Some(MenuKey::Back),
        _ => None,
    }
}

/// Check if key should quit the program.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events onto per-player [`crate::types::Command`]s and
//! tracks pressed/held state for each player. Terminals that never send key
//! release events are handled with a release timeout.

pub mod handler;
pub mod map;

pub use splitris_types as types;

pub use handler::{InputRouter, PlayerInput};
pub use map::{host_action, menu_key, should_quit, HostAction, KeyMap, MenuKey};

//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It avoids widget libraries and instead renders into a simple framebuffer
//! that is diffed and flushed to the terminal.
//!
//! - [`GameView`] paints one to four running sessions side by side; it is the
//!   block sink the sessions draw through
//! - [`menu_view`] paints the title, menu, player selection and results screens
//! - [`TerminalRenderer`] owns the terminal and writes only what changed
//! - [`BellAudio`] is the audio sink

pub mod audio;
pub mod fb;
pub mod game_view;
pub mod menu_view;
pub mod renderer;

pub use splitris_core as core;
pub use splitris_types as types;

pub use audio::BellAudio;
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, PlayerPanel, Viewport};
pub use menu_view::ResultRow;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};

//! Core game logic - pure, deterministic, and testable
//!
//! Everything that decides how pieces move and how a game is scored lives here.
//! The crate has no dependency on terminals, sound or files: the host passes in
//! capabilities ([`InputSource`], [`BlockSink`], [`AudioSink`],
//! [`HighScoreStore`]) and drives each [`Session`] once per frame.
//!
//! # Module Structure
//!
//! - [`scheme`]: 4x4 occupancy masks of every kind and rotation, loaded once
//! - [`field`]: 10x20 grid of locked blocks with line clearing
//! - [`tetrimino`]: the active piece (spawn, shift, rotate with kicks, fall)
//! - [`kick`]: ordered wall-kick offsets
//! - [`rng`]: seeded random piece configurations
//! - [`queue`]: lookahead queue and hold slot
//! - [`scoring`]: line clear and combo points
//! - [`session`]: one player's game, the per-frame orchestrator
//! - [`sink`]: collaborator traits
//! - [`testing`]: in-memory collaborators
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use splitris_core::{NullAudio, SchemeTable, ScriptedInput, Session, Tuning};
//! use splitris_types::Command;
//!
//! let schemes = Arc::new(SchemeTable::builtin().unwrap());
//! let mut session = Session::new(schemes, Tuning::default(), 12345);
//!
//! let mut input = ScriptedInput::new();
//! input.press(Command::HardDrop);
//! session.handle_input(&input, &mut NullAudio);
//! session.do_logic(16, &mut NullAudio);
//!
//! assert_eq!(session.pieces_locked(), 1);
//! assert!(!session.game_over());
//! ```
//!
//! # Timing
//!
//! Time only moves when the host says so: `do_logic(dt_ms)` integrates gravity
//! and auto-repeat over `dt_ms`, carrying fractions between calls. A paused
//! session is one that is not being called.

pub mod field;
pub mod kick;
pub mod queue;
pub mod rng;
pub mod scheme;
pub mod scoring;
pub mod session;
pub mod sink;
pub mod snapshot;
pub mod testing;
pub mod tetrimino;

pub use splitris_types as types;

pub use field::Field;
pub use kick::KickTable;
pub use queue::{Hold, PieceQueue};
pub use rng::SimpleRng;
pub use scheme::{Mask, SchemeError, SchemeTable};
pub use scoring::{ScoreResult, ScoreRules};
pub use session::{LockEvent, Session, Tuning};
pub use sink::{
    record_high_score, AudioSink, BlockSink, BlockStyle, HighScoreStore, InputSource, NullAudio,
    PreviewSlot,
};
pub use snapshot::{ActiveSnapshot, SessionSnapshot};
pub use testing::{MemoryHighScore, RecordingAudio, RecordingSink, ScriptedInput};
pub use tetrimino::{PieceState, Repeat, Tetrimino};

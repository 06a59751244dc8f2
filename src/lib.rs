//! Splitris (workspace facade crate).
//!
//! Re-exports the engine crates under `splitris::{core,input,term,types}` and
//! holds the host pieces the binary is built from: configuration, logging,
//! the high-score file and the screen state machine.

pub use splitris_core as core;
pub use splitris_input as input;
pub use splitris_term as term;
pub use splitris_types as types;

pub mod app;
pub mod config;
pub mod highscore;
pub mod logger;

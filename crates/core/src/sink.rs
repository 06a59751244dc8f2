//! Collaborator interfaces
//!
//! The simulation never touches a terminal, a sound device or a file. It calls
//! into these capabilities instead, which the host implements:
//!
//! - [`InputSource`]: edge and held state of each [`Command`]
//! - [`BlockSink`]: draw a block at a field cell, draw a 4x4 preview
//! - [`AudioSink`]: fire-and-forget [`SoundEvent`]s
//! - [`HighScoreStore`]: a single persisted integer

use crate::scheme::Mask;
use crate::types::{Command, PieceConfig, PieceKind, SoundEvent};

/// Command-oriented input state for one player.
pub trait InputSource {
    /// The command went down since the previous frame (OS key repeat ignored).
    fn pressed(&self, command: Command) -> bool;

    /// The command is currently held.
    fn held(&self, command: Command) -> bool;
}

/// How a block should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// Part of the field.
    Locked,
    /// Part of the falling piece.
    Active,
    /// Landing projection of the falling piece.
    Ghost,
}

/// Where a preview belongs on the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSlot {
    Hold,
    /// Position in the lookahead queue, 0 = next.
    Queue(usize),
}

/// Drawing capability handed to [`crate::Session::render`].
pub trait BlockSink {
    /// Draw one block at field cell `(x, y)`. Rows above the field (`y < 0`)
    /// are never passed.
    fn draw_block(&mut self, x: i8, y: i8, kind: PieceKind, style: BlockStyle);

    /// Draw a static piece preview. Where the slot lands on screen is up to
    /// the sink.
    fn draw_preview(&mut self, slot: PreviewSlot, config: PieceConfig, mask: &Mask);
}

/// Fire-and-forget sound notifications.
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Audio sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

impl<T: AudioSink + ?Sized> AudioSink for &mut T {
    fn play(&mut self, event: SoundEvent) {
        (**self).play(event)
    }
}

/// The persisted high score.
pub trait HighScoreStore {
    /// Stored value; a missing or unreadable store reads as 0.
    fn get_high_score(&mut self) -> u32;

    fn set_high_score(&mut self, score: u32) -> std::io::Result<()>;
}

/// Store `score` if it beats the stored value.
///
/// Returns whether it was a new high score. A failed write leaves the
/// in-memory score alone and is reported to the caller.
pub fn record_high_score<S: HighScoreStore + ?Sized>(
    store: &mut S,
    score: u32,
) -> std::io::Result<bool> {
    if score <= store.get_high_score() {
        return Ok(false);
    }
    store.set_high_score(score)?;
    Ok(true)
}

//! In-memory collaborators for tests, benchmarks and headless runs.

use crate::scheme::Mask;
use crate::sink::{AudioSink, BlockSink, BlockStyle, HighScoreStore, InputSource, PreviewSlot};
use crate::types::{Command, PieceConfig, PieceKind, SoundEvent};

/// Audio sink that remembers every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub events: Vec<SoundEvent>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: SoundEvent) -> bool {
        self.events.contains(&event)
    }

    pub fn count(&self, event: SoundEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, event: SoundEvent) {
        self.events.push(event);
    }
}

/// Input source driven directly by the test.
///
/// `press` marks a command both pressed and held; [`ScriptedInput::end_frame`]
/// clears the edge flags the way a real input source does between frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedInput {
    pressed: [bool; 7],
    held: [bool; 7],
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, command: Command) -> &mut Self {
        self.pressed[command.index()] = true;
        self.held[command.index()] = true;
        self
    }

    /// Held without a fresh edge (key kept down from an earlier frame).
    pub fn hold(&mut self, command: Command) -> &mut Self {
        self.held[command.index()] = true;
        self
    }

    pub fn release(&mut self, command: Command) -> &mut Self {
        self.pressed[command.index()] = false;
        self.held[command.index()] = false;
        self
    }

    pub fn end_frame(&mut self) {
        self.pressed = [false; 7];
    }
}

impl InputSource for ScriptedInput {
    fn pressed(&self, command: Command) -> bool {
        self.pressed[command.index()]
    }

    fn held(&self, command: Command) -> bool {
        self.held[command.index()]
    }
}

/// Block sink that records draw calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub blocks: Vec<(i8, i8, PieceKind, BlockStyle)>,
    pub previews: Vec<(PreviewSlot, PieceConfig)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, style: BlockStyle) -> usize {
        self.blocks.iter().filter(|b| b.3 == style).count()
    }
}

impl BlockSink for RecordingSink {
    fn draw_block(&mut self, x: i8, y: i8, kind: PieceKind, style: BlockStyle) {
        self.blocks.push((x, y, kind, style));
    }

    fn draw_preview(&mut self, slot: PreviewSlot, config: PieceConfig, _mask: &Mask) {
        self.previews.push((slot, config));
    }
}

/// High score kept in memory; optionally fails every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    pub score: u32,
    pub fail_writes: bool,
}

impl MemoryHighScore {
    pub fn new(score: u32) -> Self {
        Self {
            score,
            fail_writes: false,
        }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn get_high_score(&mut self) -> u32 {
        self.score
    }

    fn set_high_score(&mut self, score: u32) -> std::io::Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only store",
            ));
        }
        self.score = score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::record_high_score;

    #[test]
    fn high_score_only_written_when_beaten() {
        let mut store = MemoryHighScore::new(5000);
        assert!(!record_high_score(&mut store, 4000).unwrap());
        assert!(!record_high_score(&mut store, 5000).unwrap());
        assert!(record_high_score(&mut store, 6000).unwrap());
        assert_eq!(store.score, 6000);
    }

    #[test]
    fn failed_write_is_reported_not_fatal() {
        let mut store = MemoryHighScore::new(0);
        store.fail_writes = true;
        assert!(record_high_score(&mut store, 100).is_err());
        assert_eq!(store.score, 0);
    }

    #[test]
    fn scripted_input_edges_clear_per_frame() {
        let mut input = ScriptedInput::new();
        input.press(Command::MoveLeft);
        assert!(input.pressed(Command::MoveLeft));
        input.end_frame();
        assert!(!input.pressed(Command::MoveLeft));
        assert!(input.held(Command::MoveLeft));
    }
}

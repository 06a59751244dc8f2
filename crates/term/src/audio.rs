//! Terminal audio: the bell.
//!
//! Terminals have one sound. It is kept for the two events worth interrupting
//! for, a four-line clear and a top-out; everything else is silent.

use crate::core::AudioSink;
use crate::types::SoundEvent;

/// Audio sink that requests a terminal bell.
///
/// Sessions call [`AudioSink::play`] in the middle of a frame, while the
/// renderer owns the terminal, so the bell is only recorded here and rung by
/// the host after drawing.
#[derive(Debug, Clone, Default)]
pub struct BellAudio {
    muted: bool,
    pending: bool,
}

impl BellAudio {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            pending: false,
        }
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.pending = false;
        self.muted
    }

    /// Whether a bell is due; clears the request.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for BellAudio {
    fn play(&mut self, event: SoundEvent) {
        if self.muted {
            return;
        }
        if matches!(event, SoundEvent::Tetris | SoundEvent::GameOver) {
            self.pending = true;
        }
    }
}

use crate::types::PieceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub config: PieceConfig,
    pub x: i8,
    pub y: i8,
}

/// Side panel view of a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub score: u32,
    pub lines: u32,
    pub combo: u32,
    pub pieces_locked: u32,
    pub fall_delay_ms: u32,
    pub hold: Option<PieceConfig>,
    pub can_hold: bool,
    pub queue: Vec<PieceConfig>,
    pub active: Option<ActiveSnapshot>,
    /// Row of the ghost's box, when a ghost is shown.
    pub ghost_y: Option<i8>,
    pub game_over: bool,
}

impl SessionSnapshot {
    /// Fall speed as a 1-based level for display: one level per 100ms the
    /// fall delay has dropped.
    pub fn speed_level(&self, initial_fall_delay_ms: u32) -> u32 {
        initial_fall_delay_ms.saturating_sub(self.fall_delay_ms) / 100 + 1
    }
}

//! RNG module - random piece configurations
//!
//! Fresh queue entries pick a kind uniformly from the seven kinds and a
//! rotation uniformly from the four orientations. The generator is a small
//! seeded LCG so that a session started from the same seed deals the same
//! pieces, which keeps tests and benchmarks reproducible.

use crate::types::{PieceConfig, PieceKind, Rotation};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max.max(1)
    }

    /// A uniformly random kind in a uniformly random rotation.
    pub fn next_config(&mut self) -> PieceConfig {
        let kind = PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize];
        let rotation = Rotation::ALL[self.next_range(Rotation::ALL.len() as u32) as usize];
        PieceConfig::new(kind, rotation)
    }

    /// Current internal state (reseeding with it continues the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

//! Scoring module - line clear and combo points
//!
//! Clearing `k` lines (1-4) at once awards `k * line_points` plus
//! `combo * combo_points`, where `combo` is the number of consecutive clearing
//! locks *before* this one, plus a flat bonus when `k == 4`. A lock that clears
//! nothing resets the combo.

use crate::types::{COMBO_POINTS, LINE_POINTS, TETRIS_BONUS};

/// Point values of the scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRules {
    pub line_points: u32,
    pub combo_points: u32,
    pub tetris_bonus: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            line_points: LINE_POINTS,
            combo_points: COMBO_POINTS,
            tetris_bonus: TETRIS_BONUS,
        }
    }
}

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// `lines * line_points`
    pub line_clear_score: u32,
    pub combo_bonus: u32,
    pub tetris_bonus: u32,
    pub total: u32,
    /// Combo counter after this lock.
    pub combo: u32,
}

impl ScoreRules {
    /// Score a lock that cleared `lines` rows while the combo counter was
    /// `combo`.
    pub fn score(&self, lines: u32, combo: u32) -> ScoreResult {
        if lines == 0 {
            return ScoreResult::default();
        }

        let line_clear_score = self.line_points.saturating_mul(lines);
        let combo_bonus = self.combo_points.saturating_mul(combo);
        let tetris_bonus = if lines >= 4 { self.tetris_bonus } else { 0 };

        ScoreResult {
            line_clear_score,
            combo_bonus,
            tetris_bonus,
            total: line_clear_score
                .saturating_add(combo_bonus)
                .saturating_add(tetris_bonus),
            combo: combo.saturating_add(1),
        }
    }
}

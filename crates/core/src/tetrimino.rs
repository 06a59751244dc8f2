//! Tetrimino module - the active piece state machine
//!
//! A [`Tetrimino`] moves through `Unspawned -> Live -> Locked`. While live, its
//! occupied cells never overlap a locked field block and never leave the field
//! sideways or through the floor: every shift, rotation and fall step is tested
//! first and rejected (the piece is left exactly as it was) if it would break
//! that rule. Locking transfers the blocks into the [`Field`]; afterwards every
//! operation is a harmless no-op until the next `spawn`.
//!
//! The piece keeps its footprint inline (at most 16 offsets), so spawning and
//! locking never allocate.

use std::sync::Arc;

use crate::field::Field;
use crate::kick::KickTable;
use crate::scheme::{Footprint, SchemeTable};
use crate::types::{PieceConfig, PieceKind, Rotation, REPEAT_UNIT, SOFT_DROP_FACTOR};

/// Lifecycle of a piece instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceState {
    Unspawned,
    Live,
    Locked,
}

/// Signed auto-repeat integrator.
///
/// `velocity` is in steps per second. Elapsed time is integrated into
/// `accumulated`; every [`REPEAT_UNIT`] produces one step and the remainder is
/// carried, so the repeat rate does not depend on the frame rate. A fresh
/// press may charge for `charge_ms` before integration starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repeat {
    velocity: i32,
    charge_ms: u32,
    accumulated: i32,
}

impl Repeat {
    pub fn velocity(&self) -> i32 {
        self.velocity
    }

    /// Set the velocity. Changing direction (or stopping) restarts the charge.
    pub fn set(&mut self, velocity: i32, charge_ms: u32) {
        if velocity.signum() != self.velocity.signum() {
            self.accumulated = 0;
            self.charge_ms = charge_ms;
        }
        self.velocity = velocity;
        if velocity == 0 {
            self.charge_ms = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Integrate `dt_ms` and return the signed number of whole steps due.
    pub fn advance(&mut self, dt_ms: u32) -> i32 {
        if self.velocity == 0 {
            self.accumulated = 0;
            return 0;
        }

        let mut dt = dt_ms;
        if self.charge_ms > 0 {
            let spent = self.charge_ms.min(dt);
            self.charge_ms -= spent;
            dt -= spent;
        }

        self.accumulated = self
            .accumulated
            .saturating_add(self.velocity.abs().saturating_mul(dt as i32));
        let steps = self.accumulated / REPEAT_UNIT;
        self.accumulated -= steps * REPEAT_UNIT;
        steps * self.velocity.signum()
    }
}

/// What one [`Tetrimino::auto_move`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoMove {
    pub shifted: u32,
    pub rotated: u32,
    pub blocked: bool,
}

/// The active falling piece.
#[derive(Debug, Clone)]
pub struct Tetrimino {
    schemes: Arc<SchemeTable>,
    kicks: KickTable,
    state: PieceState,
    config: PieceConfig,
    x: i8,
    y: i8,
    footprint: Footprint,
    fall_delay_ms: u32,
    fall_elapsed_ms: u32,
    accelerated: bool,
    shift_repeat: Repeat,
    rotate_repeat: Repeat,
    /// Blocks discarded by the last lock because they were above the field.
    lock_out: bool,
}

impl Tetrimino {
    pub fn new(schemes: Arc<SchemeTable>, kicks: KickTable) -> Self {
        Self {
            schemes,
            kicks,
            state: PieceState::Unspawned,
            config: PieceConfig::new(PieceKind::I, Rotation::North),
            x: 0,
            y: 0,
            footprint: Footprint::new(),
            fall_delay_ms: 1,
            fall_elapsed_ms: 0,
            accelerated: false,
            shift_repeat: Repeat::default(),
            rotate_repeat: Repeat::default(),
            lock_out: false,
        }
    }

    /// Place a fresh piece with its box's top-left corner at `(x, y)`.
    ///
    /// The piece is always fully initialized. The return value is `false` when
    /// its footprint already overlaps a locked block, which the caller treats
    /// as a top-out.
    pub fn spawn(
        &mut self,
        field: &Field,
        x: i8,
        y: i8,
        fall_delay_ms: u32,
        config: PieceConfig,
    ) -> bool {
        self.state = PieceState::Live;
        self.config = config;
        self.x = x;
        self.y = y;
        self.footprint = self.schemes.footprint(config);
        self.fall_delay_ms = fall_delay_ms.max(1);
        self.fall_elapsed_ms = 0;
        self.accelerated = false;
        self.shift_repeat.reset();
        self.rotate_repeat.reset();
        self.lock_out = false;

        !self.collides(field)
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == PieceState::Live && !self.footprint.is_empty()
    }

    pub fn config(&self) -> PieceConfig {
        self.config
    }

    pub fn kind(&self) -> PieceKind {
        self.config.kind
    }

    pub fn position(&self) -> (i8, i8) {
        (self.x, self.y)
    }

    pub fn fall_delay_ms(&self) -> u32 {
        self.fall_delay_ms
    }

    pub fn fall_elapsed_ms(&self) -> u32 {
        self.fall_elapsed_ms
    }

    pub fn block_count(&self) -> usize {
        self.footprint.len()
    }

    /// Whether the last lock discarded blocks above the top of the field.
    pub fn lock_out(&self) -> bool {
        self.lock_out
    }

    pub fn kicks(&self) -> KickTable {
        self.kicks
    }

    /// Absolute field coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.footprint
            .iter()
            .map(move |&(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Soft drop: divide the effective fall delay while set.
    pub fn set_accelerated(&mut self, accelerated: bool) {
        self.accelerated = accelerated;
    }

    pub fn accelerated(&self) -> bool {
        self.accelerated
    }

    /// Fall delay currently in effect (soft drop applied).
    pub fn effective_fall_delay_ms(&self) -> u32 {
        if self.accelerated {
            (self.fall_delay_ms / SOFT_DROP_FACTOR).max(1)
        } else {
            self.fall_delay_ms
        }
    }

    /// Make the next `fall` call take a step immediately.
    pub fn expire_fall_timer(&mut self) {
        self.fall_elapsed_ms = self.effective_fall_delay_ms();
    }

    pub fn shift_repeat(&self) -> &Repeat {
        &self.shift_repeat
    }

    pub fn rotate_repeat(&self) -> &Repeat {
        &self.rotate_repeat
    }

    /// Horizontal auto-repeat velocity (cells per second, positive = right).
    pub fn set_shift_velocity(&mut self, velocity: i32, charge_ms: u32) {
        self.shift_repeat.set(velocity, charge_ms);
    }

    /// Rotational auto-repeat velocity (turns per second, positive = clockwise).
    pub fn set_rotate_velocity(&mut self, velocity: i32, charge_ms: u32) {
        self.rotate_repeat.set(velocity, charge_ms);
    }

    fn collides_with(&self, field: &Field, footprint: &Footprint, x: i8, y: i8) -> bool {
        footprint
            .iter()
            .any(|&(dx, dy)| field.has_block(x + dx, y + dy))
    }

    fn collides(&self, field: &Field) -> bool {
        self.collides_with(field, &self.footprint, self.x, self.y)
    }

    /// A block or the left wall is directly left of some occupied cell.
    pub fn check_collision_left(&self, field: &Field) -> bool {
        self.cells().any(|(x, y)| x - 1 < 0 || field.has_block(x - 1, y))
    }

    /// A block or the right wall is directly right of some occupied cell.
    pub fn check_collision_right(&self, field: &Field) -> bool {
        let width = field.width() as i8;
        self.cells()
            .any(|(x, y)| x + 1 >= width || field.has_block(x + 1, y))
    }

    /// A block or the floor is directly below some occupied cell.
    pub fn check_collision_bottom(&self, field: &Field) -> bool {
        let height = field.height() as i8;
        self.cells()
            .any(|(x, y)| y + 1 >= height || field.has_block(x, y + 1))
    }

    /// Move `dx` columns; rejected moves leave the piece untouched.
    pub fn shift(&mut self, field: &Field, dx: i8) -> bool {
        if !self.is_live() || dx == 0 {
            return false;
        }
        let blocked = match dx {
            -1 => self.check_collision_left(field),
            1 => self.check_collision_right(field),
            _ => self.collides_with(field, &self.footprint, self.x + dx, self.y),
        };
        if blocked {
            return false;
        }
        self.x += dx;
        true
    }

    /// Move down until resting on the floor or a block. Does not lock.
    ///
    /// Returns the number of rows travelled.
    pub fn drop(&mut self, field: &Field) -> u32 {
        if !self.is_live() {
            return 0;
        }
        let mut rows = 0;
        while !self.check_collision_bottom(field) {
            self.y += 1;
            rows += 1;
        }
        rows
    }

    /// Rotate by `direction` quarter turns (positive = clockwise).
    ///
    /// The rotated footprint is tried in place first. If it is blocked and
    /// `allow_kick` is set, each kick offset is tried in order and the first
    /// fit is committed. Otherwise rotation and position are left unchanged.
    pub fn rotate(&mut self, field: &Field, direction: i8, allow_kick: bool) -> bool {
        if !self.is_live() {
            return false;
        }

        let rotated = PieceConfig::new(self.config.kind, self.config.rotation.turned(direction));
        let footprint = self.schemes.footprint(rotated);

        let kicks = if allow_kick { self.kicks.offsets() } else { &[] };
        let found = std::iter::once((0i8, 0i8))
            .chain(kicks.iter().copied())
            .find(|&(dx, dy)| !self.collides_with(field, &footprint, self.x + dx, self.y + dy));

        match found {
            Some((dx, dy)) => {
                self.config = rotated;
                self.footprint = footprint;
                self.x += dx;
                self.y += dy;
                true
            }
            None => false,
        }
    }

    /// Advance gravity by `dt_ms`.
    ///
    /// Every elapsed delay unit moves the piece one row down, or locks it into
    /// the field when it already rests on something. Returns `true` if the
    /// piece locked during this call; a locked piece ignores further calls.
    pub fn fall(&mut self, field: &mut Field, dt_ms: u32) -> bool {
        if !self.is_live() {
            return false;
        }

        self.fall_elapsed_ms = self.fall_elapsed_ms.saturating_add(dt_ms);
        loop {
            let delay = self.effective_fall_delay_ms();
            if self.fall_elapsed_ms < delay {
                return false;
            }
            self.fall_elapsed_ms -= delay;

            if self.check_collision_bottom(field) {
                self.lock(field);
                return true;
            }
            self.y += 1;
        }
    }

    /// Integrate the auto-repeat velocities over `dt_ms`.
    ///
    /// Each whole step performs one shift or one rotation (with kicks). A
    /// blocked step ends that axis for this call.
    pub fn auto_move(&mut self, field: &Field, dt_ms: u32) -> AutoMove {
        let mut out = AutoMove::default();
        if !self.is_live() {
            return out;
        }

        let shifts = self.shift_repeat.advance(dt_ms);
        for _ in 0..shifts.unsigned_abs() {
            if self.shift(field, shifts.signum() as i8) {
                out.shifted += 1;
            } else {
                out.blocked = true;
                break;
            }
        }

        let turns = self.rotate_repeat.advance(dt_ms);
        for _ in 0..turns.unsigned_abs() {
            if self.rotate(field, turns.signum() as i8, true) {
                out.rotated += 1;
            } else {
                out.blocked = true;
                break;
            }
        }

        out
    }

    /// Transfer the occupied cells into the field.
    fn lock(&mut self, field: &mut Field) {
        let kind = self.config.kind;
        let mut lock_out = false;
        for (x, y) in self.cells().collect::<Footprint>() {
            if !field.add_block(x, y, kind) {
                lock_out = true;
            }
        }
        self.lock_out = lock_out;
        self.footprint.clear();
        self.state = PieceState::Locked;
    }

    /// Drop the piece without locking it (hold exchange).
    pub fn discard(&mut self) {
        self.footprint.clear();
        self.state = PieceState::Unspawned;
        self.shift_repeat.reset();
        self.rotate_repeat.reset();
    }

    /// Landing position of this piece, or `None` when it already rests on a
    /// surface (or is not live).
    pub fn ghost(&self, field: &Field) -> Option<(i8, i8)> {
        if !self.is_live() || self.check_collision_bottom(field) {
            return None;
        }
        let mut ghost = Tetrimino::new(Arc::clone(&self.schemes), self.kicks);
        ghost.spawn(field, self.x, self.y, self.fall_delay_ms, self.config);
        ghost.drop(field);
        Some(ghost.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FIELD_HEIGHT, SPAWN_X, SPAWN_Y};

    fn piece() -> Tetrimino {
        Tetrimino::new(Arc::new(SchemeTable::builtin().unwrap()), KickTable::STANDARD)
    }

    fn config(kind: PieceKind, rotation: Rotation) -> PieceConfig {
        PieceConfig::new(kind, rotation)
    }

    #[test]
    fn repeat_carries_fractional_time() {
        let mut r = Repeat::default();
        r.set(15, 0);
        // 15 cells/s: one step per 66.67ms.
        assert_eq!(r.advance(50), 0);
        assert_eq!(r.advance(50), 1);
        assert_eq!(r.advance(100), 1);
        assert_eq!(r.advance(1000), 15);
    }

    #[test]
    fn repeat_charge_delays_first_step() {
        let mut r = Repeat::default();
        r.set(-10, 150);
        assert_eq!(r.advance(150), 0);
        assert_eq!(r.advance(100), -1);
        // Same direction keeps progress.
        r.set(-10, 150);
        assert_eq!(r.advance(100), -1);
        // Reversal restarts the charge.
        r.set(10, 150);
        assert_eq!(r.advance(200), 0);
    }

    #[test]
    fn spawn_reports_overlap_but_still_initializes() {
        let mut field = Field::new();
        field.add_block(4, 0, PieceKind::Z);
        let mut t = piece();
        assert!(!t.spawn(&field, SPAWN_X, SPAWN_Y, 500, config(PieceKind::O, Rotation::North)));
        assert_eq!(t.state(), PieceState::Live);
        assert_eq!(t.block_count(), 4);
        assert_eq!(t.position(), (SPAWN_X, SPAWN_Y));
    }

    #[test]
    fn o_piece_falls_height_minus_two_rows_then_locks() {
        let mut field = Field::new();
        let mut t = piece();
        assert!(t.spawn(&field, SPAWN_X, SPAWN_Y, 100, config(PieceKind::O, Rotation::North)));

        let mut falls = 0;
        while !t.fall(&mut field, 100) {
            falls += 1;
            assert!(falls <= FIELD_HEIGHT as usize);
        }
        assert_eq!(falls, FIELD_HEIGHT as usize - 2);
        assert_eq!(t.state(), PieceState::Locked);
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert_eq!(field.get(x, y), Some(Some(PieceKind::O)));
        }
        assert_eq!(field.block_count(), 4);
    }

    #[test]
    fn large_dt_locks_only_once() {
        let mut field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 10, config(PieceKind::O, Rotation::North));
        assert!(t.fall(&mut field, 10_000));
        assert_eq!(field.block_count(), 4);
        assert!(!t.fall(&mut field, 10_000));
        assert_eq!(field.block_count(), 4);
    }

    #[test]
    fn sub_delay_fall_never_moves() {
        let mut field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 300, config(PieceKind::T, Rotation::North));
        for _ in 0..29 {
            assert!(!t.fall(&mut field, 10));
        }
        assert_eq!(t.position(), (SPAWN_X, SPAWN_Y));
        assert!(!t.fall(&mut field, 10));
        assert_eq!(t.position(), (SPAWN_X, SPAWN_Y + 1));
    }

    #[test]
    fn soft_drop_divides_delay() {
        let mut field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 500, config(PieceKind::T, Rotation::North));
        t.set_accelerated(true);
        assert_eq!(t.effective_fall_delay_ms(), 50);
        t.fall(&mut field, 100);
        assert_eq!(t.position().1, SPAWN_Y + 2);
    }

    #[test]
    fn shift_is_rejected_at_wall() {
        let field = Field::new();
        let mut t = piece();
        t.spawn(&field, 0, 5, 500, config(PieceKind::O, Rotation::North));
        // O occupies columns 1..=2 of its box.
        assert!(t.shift(&field, -1));
        assert_eq!(t.position(), (-1, 5));
        assert!(!t.shift(&field, -1));
        assert_eq!(t.position(), (-1, 5));
    }

    #[test]
    fn drop_rests_on_stack_without_locking() {
        let mut field = Field::new();
        for x in 0..10 {
            field.add_block(x, 19, PieceKind::I);
        }
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 500, config(PieceKind::O, Rotation::North));
        assert_eq!(t.drop(&field), 17);
        assert_eq!(t.position(), (SPAWN_X, 17));
        assert_eq!(t.state(), PieceState::Live);
        assert_eq!(field.block_count(), 10);
    }

    #[test]
    fn i_piece_against_left_wall_kicks_right_by_two() {
        let field = Field::new();
        let mut t = piece();
        // Vertical I in column 2 of its box, flush against the left wall.
        t.spawn(&field, -2, 5, 500, config(PieceKind::I, Rotation::East));
        assert!(t.check_collision_left(&field));

        assert!(t.rotate(&field, 1, true));
        assert_eq!(t.config().rotation, Rotation::South);
        assert_eq!(t.position(), (0, 5));
        assert!(t.cells().all(|(x, _)| (0..10).contains(&x)));
    }

    #[test]
    fn rotation_without_kick_is_reverted_exactly() {
        let field = Field::new();
        let mut t = piece();
        t.spawn(&field, -2, 5, 500, config(PieceKind::I, Rotation::East));
        assert!(!t.rotate(&field, 1, false));
        assert_eq!(t.config().rotation, Rotation::East);
        assert_eq!(t.position(), (-2, 5));
    }

    #[test]
    fn boxed_in_piece_cannot_rotate() {
        let mut field = Field::new();
        // Fill everything around a vertical I at column 0, rows 10..=13.
        for y in 6..20 {
            for x in 0..10 {
                if !(x == 0 && (10..14).contains(&y)) {
                    field.add_block(x, y, PieceKind::Z);
                }
            }
        }
        let mut t = piece();
        assert!(t.spawn(&field, -2, 10, 500, config(PieceKind::I, Rotation::East)));
        assert!(!t.rotate(&field, 1, true));
        assert_eq!(t.config().rotation, Rotation::East);
        assert_eq!(t.position(), (-2, 10));
    }

    #[test]
    fn operations_after_lock_are_noops() {
        let mut field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, 17, 10, config(PieceKind::O, Rotation::North));
        t.drop(&field);
        assert!(t.fall(&mut field, 10));
        assert_eq!(t.block_count(), 0);
        assert!(!t.shift(&field, 1));
        assert!(!t.rotate(&field, 1, true));
        assert_eq!(t.drop(&field), 0);
        assert!(!t.fall(&mut field, 1000));
        assert_eq!(field.block_count(), 4);
    }

    #[test]
    fn lock_above_top_reports_lock_out() {
        let mut field = Field::new();
        for y in 1..20 {
            field.add_block(4, y, PieceKind::I);
        }
        let mut t = piece();
        // T pointing up at row -1: its stem is above the field.
        t.spawn(&field, 3, -1, 10, config(PieceKind::T, Rotation::North));
        assert!(t.fall(&mut field, 10));
        assert!(t.lock_out());
    }

    #[test]
    fn auto_move_shifts_at_velocity_and_stops_at_wall() {
        let field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 1000, config(PieceKind::O, Rotation::North));
        t.set_shift_velocity(-10, 0);
        let out = t.auto_move(&field, 200);
        assert_eq!(out.shifted, 2);
        assert_eq!(t.position().0, SPAWN_X - 2);
        let out = t.auto_move(&field, 1000);
        assert!(out.blocked);
        assert_eq!(t.position().0, -1);
    }

    #[test]
    fn ghost_projects_to_floor_and_hides_when_resting() {
        let field = Field::new();
        let mut t = piece();
        t.spawn(&field, SPAWN_X, SPAWN_Y, 1000, config(PieceKind::O, Rotation::North));
        assert_eq!(t.ghost(&field), Some((SPAWN_X, 18)));
        t.drop(&field);
        assert_eq!(t.ghost(&field), None);
    }
}

//! Session module - one player's game
//!
//! A [`Session`] ties the field, the active piece, the queue and the hold slot
//! together and applies the scoring rules. The host drives it once per frame,
//! in this order:
//!
//! 1. [`Session::handle_input`]: instant moves, auto-repeat velocities, soft
//!    and hard drop, hold requests
//! 2. [`Session::do_logic`]: pending hold exchange, auto-repeat, gravity and,
//!    on lock, line clears, scoring and the next spawn
//! 3. [`Session::render`]: hand every visible block to a [`BlockSink`]
//!
//! Once the session is over none of these change state any more. Pausing is
//! the host simply not calling them.

use std::sync::Arc;

use crate::field::Field;
use crate::kick::KickTable;
use crate::queue::{self, Hold, PieceQueue};
use crate::scheme::SchemeTable;
use crate::scoring::ScoreRules;
use crate::sink::{AudioSink, BlockSink, BlockStyle, InputSource, NullAudio, PreviewSlot};
use crate::snapshot::{ActiveSnapshot, SessionSnapshot};
use crate::tetrimino::Tetrimino;
use crate::types::{
    Command, PieceConfig, SoundEvent, FALL_DELAY_STEP_MS, INITIAL_FALL_DELAY_MS,
    MIN_FALL_DELAY_MS, QUEUE_LEN, REPEAT_DELAY_MS, ROTATE_VELOCITY, SHIFT_VELOCITY, SPAWN_X,
    SPAWN_Y,
};

/// Game pacing and rules of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Lookahead length, clamped to `1..=QUEUE_LEN`.
    pub queue_len: usize,
    pub spawn_x: i8,
    pub spawn_y: i8,
    pub initial_fall_delay_ms: u32,
    /// Decrease of the fall delay after each locked piece.
    pub fall_delay_step_ms: u32,
    pub min_fall_delay_ms: u32,
    /// Cells per second while a shift key is held.
    pub shift_velocity: i32,
    /// Quarter turns per second while a rotate key is held.
    pub rotate_velocity: i32,
    pub repeat_delay_ms: u32,
    pub scoring: ScoreRules,
    pub kicks: KickTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            queue_len: QUEUE_LEN,
            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            initial_fall_delay_ms: INITIAL_FALL_DELAY_MS,
            fall_delay_step_ms: FALL_DELAY_STEP_MS,
            min_fall_delay_ms: MIN_FALL_DELAY_MS,
            shift_velocity: SHIFT_VELOCITY,
            rotate_velocity: ROTATE_VELOCITY,
            repeat_delay_ms: REPEAT_DELAY_MS,
            scoring: ScoreRules::default(),
            kicks: KickTable::STANDARD,
        }
    }
}

/// What the last lock did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub points: u32,
    /// Combo counter after the lock.
    pub combo: u32,
    pub tetris: bool,
    /// Part of the piece locked above the field.
    pub lock_out: bool,
}

/// One player's game.
#[derive(Debug, Clone)]
pub struct Session {
    schemes: Arc<SchemeTable>,
    tuning: Tuning,
    field: Field,
    piece: Tetrimino,
    queue: PieceQueue,
    hold: Hold,
    fall_delay_ms: u32,
    score: u32,
    lines: u32,
    combo: u32,
    pieces_locked: u32,
    game_over: bool,
    swap_pending: bool,
    /// Held state from the latest `handle_input`, used to seed new pieces.
    held: [bool; 7],
    last_event: Option<LockEvent>,
}

impl Session {
    /// Start a session: empty field, fresh queue, first piece spawned.
    pub fn new(schemes: Arc<SchemeTable>, tuning: Tuning, seed: u32) -> Self {
        let piece = Tetrimino::new(Arc::clone(&schemes), tuning.kicks);
        let mut session = Self {
            schemes,
            tuning,
            field: Field::new(),
            piece,
            queue: PieceQueue::new(tuning.queue_len, seed),
            hold: Hold::new(),
            fall_delay_ms: tuning.initial_fall_delay_ms.max(1),
            score: 0,
            lines: 0,
            combo: 0,
            pieces_locked: 0,
            game_over: false,
            swap_pending: false,
            held: [false; 7],
            last_event: None,
        };
        session.spawn_next(&mut NullAudio);
        session
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn schemes(&self) -> &Arc<SchemeTable> {
        &self.schemes
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Direct field access for setting up positions.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn piece(&self) -> &Tetrimino {
        &self.piece
    }

    /// Direct piece access; moves must be passed the field explicitly.
    pub fn piece_mut(&mut self) -> (&mut Tetrimino, &mut Field) {
        (&mut self.piece, &mut self.field)
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    pub fn hold(&self) -> &Hold {
        &self.hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Fall delay handed to the next spawned piece.
    pub fn fall_delay_ms(&self) -> u32 {
        self.fall_delay_ms
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Read the player's commands for this frame.
    pub fn handle_input<I, A>(&mut self, input: &I, audio: &mut A)
    where
        I: InputSource + ?Sized,
        A: AudioSink + ?Sized,
    {
        if self.game_over {
            return;
        }
        for command in Command::ALL {
            self.held[command.index()] = input.held(command);
        }
        if !self.piece.is_live() {
            return;
        }

        let charge = self.tuning.repeat_delay_ms;

        // Shift: a fresh press moves at once and restarts the charge.
        let shift_dir = if input.pressed(Command::MoveLeft) {
            -1
        } else if input.pressed(Command::MoveRight) {
            1
        } else {
            0
        };
        if shift_dir != 0 {
            self.piece.set_shift_velocity(0, 0);
            if self.piece.shift(&self.field, shift_dir) {
                audio.play(SoundEvent::Move);
            } else {
                audio.play(SoundEvent::Blocked);
            }
        }
        let shift_velocity = self.held_direction(
            input,
            Command::MoveLeft,
            Command::MoveRight,
            shift_dir,
            self.piece.shift_repeat().velocity(),
        ) * self.tuning.shift_velocity;
        self.piece.set_shift_velocity(shift_velocity, charge);

        let turn_dir = if input.pressed(Command::RotateCcw) {
            -1
        } else if input.pressed(Command::RotateCw) {
            1
        } else {
            0
        };
        if turn_dir != 0 {
            self.piece.set_rotate_velocity(0, 0);
            if self.piece.rotate(&self.field, turn_dir, true) {
                audio.play(SoundEvent::Rotate);
            } else {
                audio.play(SoundEvent::Blocked);
            }
        }
        let rotate_velocity = self.held_direction(
            input,
            Command::RotateCcw,
            Command::RotateCw,
            turn_dir,
            self.piece.rotate_repeat().velocity(),
        ) * self.tuning.rotate_velocity;
        self.piece.set_rotate_velocity(rotate_velocity, charge);

        self.piece.set_accelerated(input.held(Command::SoftDrop));

        if input.pressed(Command::HardDrop) {
            self.piece.drop(&self.field);
            self.piece.set_shift_velocity(0, 0);
            self.piece.set_rotate_velocity(0, 0);
            self.piece.expire_fall_timer();
            audio.play(SoundEvent::Drop);
        }

        if input.pressed(Command::Hold) && self.hold.can_swap() {
            self.swap_pending = true;
        }
    }

    /// Direction (-1, 0, 1) of a held axis. The latest press wins; when both
    /// keys are held the current direction is kept.
    fn held_direction<I: InputSource + ?Sized>(
        &self,
        input: &I,
        negative: Command,
        positive: Command,
        pressed_dir: i8,
        current_velocity: i32,
    ) -> i32 {
        if pressed_dir != 0 {
            return pressed_dir as i32;
        }
        match (input.held(negative), input.held(positive)) {
            (true, false) => -1,
            (false, true) => 1,
            (true, true) => current_velocity.signum(),
            (false, false) => 0,
        }
    }

    /// Advance the simulation by `dt_ms`.
    pub fn do_logic<A: AudioSink + ?Sized>(&mut self, dt_ms: u32, audio: &mut A) {
        if self.game_over {
            return;
        }

        if self.swap_pending {
            self.swap_pending = false;
            self.swap(audio);
            if self.game_over {
                return;
            }
        }

        let moved = self.piece.auto_move(&self.field, dt_ms);
        if moved.shifted > 0 {
            audio.play(SoundEvent::Move);
        }
        if moved.rotated > 0 {
            audio.play(SoundEvent::Rotate);
        }

        let row = self.piece.position().1;
        if self.piece.fall(&mut self.field, dt_ms) {
            self.on_lock(audio);
        } else if self.piece.position().1 != row {
            audio.play(SoundEvent::FallStep);
        }
    }

    fn on_lock<A: AudioSink + ?Sized>(&mut self, audio: &mut A) {
        audio.play(SoundEvent::Lock);
        self.pieces_locked += 1;
        self.hold.unlock();

        let lock_out = self.piece.lock_out();
        let cleared = self.field.clear_lines();
        let result = self.tuning.scoring.score(cleared, self.combo);
        self.combo = result.combo;
        self.score = self.score.saturating_add(result.total);
        self.lines += cleared;
        if let Some(sound) = SoundEvent::for_clear(cleared) {
            audio.play(sound);
        }

        self.fall_delay_ms = self
            .fall_delay_ms
            .saturating_sub(self.tuning.fall_delay_step_ms)
            .max(self.tuning.min_fall_delay_ms)
            .max(1);

        self.last_event = Some(LockEvent {
            lines_cleared: cleared,
            points: result.total,
            combo: self.combo,
            tetris: cleared >= 4,
            lock_out,
        });

        if lock_out {
            self.top_out(audio);
            return;
        }
        self.spawn_next(audio);
    }

    fn top_out<A: AudioSink + ?Sized>(&mut self, audio: &mut A) {
        self.game_over = true;
        self.swap_pending = false;
        self.piece.discard();
        audio.play(SoundEvent::GameOver);
    }

    /// Spawn the head of the queue. Returns `false` and ends the session when
    /// it does not fit; the failed piece adds nothing to the field.
    pub fn spawn_next<A: AudioSink + ?Sized>(&mut self, audio: &mut A) -> bool {
        if self.game_over {
            return false;
        }
        let config = self.queue.pop();
        let fits = self.piece.spawn(
            &self.field,
            self.tuning.spawn_x,
            self.tuning.spawn_y,
            self.fall_delay_ms,
            config,
        );
        if !fits {
            self.top_out(audio);
            return false;
        }

        // Keys still held carry over into the new piece, without an instant
        // move and without the charge delay.
        let held = |c: Command| self.held[c.index()];
        let shift = match (held(Command::MoveLeft), held(Command::MoveRight)) {
            (true, false) => -self.tuning.shift_velocity,
            (false, true) => self.tuning.shift_velocity,
            _ => 0,
        };
        let turn = match (held(Command::RotateCcw), held(Command::RotateCw)) {
            (true, false) => -self.tuning.rotate_velocity,
            (false, true) => self.tuning.rotate_velocity,
            _ => 0,
        };
        let soft = held(Command::SoftDrop);
        self.piece.set_shift_velocity(shift, 0);
        self.piece.set_rotate_velocity(turn, 0);
        self.piece.set_accelerated(soft);
        true
    }

    /// Exchange the active piece with the hold slot right away.
    ///
    /// A no-op returning `false` when the slot was already used by this piece
    /// or no piece is live.
    pub fn swap<A: AudioSink + ?Sized>(&mut self, audio: &mut A) -> bool {
        if self.game_over || !self.piece.is_live() {
            return false;
        }
        let current = self.piece.config();
        if !queue::swap(&mut self.queue, &mut self.hold, current) {
            return false;
        }
        self.piece.discard();
        audio.play(SoundEvent::Swap);
        self.spawn_next(audio);
        true
    }

    /// Whether a hold request is waiting for the next `do_logic`.
    pub fn swap_pending(&self) -> bool {
        self.swap_pending
    }

    /// Landing position of the active piece, if it is not already resting.
    pub fn ghost(&self) -> Option<(i8, i8)> {
        self.piece.ghost(&self.field)
    }

    /// Draw the field, the ghost, the active piece and the previews.
    pub fn render<S: BlockSink + ?Sized>(&self, sink: &mut S) {
        for (x, y, kind) in self.field.blocks() {
            sink.draw_block(x, y, kind, BlockStyle::Locked);
        }

        if self.piece.is_live() {
            let kind = self.piece.kind();
            if let Some((gx, gy)) = self.ghost() {
                let (px, py) = self.piece.position();
                for (x, y) in self.piece.cells() {
                    let (x, y) = (x - px + gx, y - py + gy);
                    if y >= 0 {
                        sink.draw_block(x, y, kind, BlockStyle::Ghost);
                    }
                }
            }
            for (x, y) in self.piece.cells().filter(|&(_, y)| y >= 0) {
                sink.draw_block(x, y, kind, BlockStyle::Active);
            }
        }

        if let Some(config) = self.hold.piece() {
            sink.draw_preview(PreviewSlot::Hold, config, self.mask(config));
        }
        for (i, &config) in self.queue.iter().enumerate() {
            sink.draw_preview(PreviewSlot::Queue(i), config, self.mask(config));
        }
    }

    fn mask(&self, config: PieceConfig) -> &crate::scheme::Mask {
        self.schemes.shape_mask(config.kind, config.rotation)
    }

    /// Plain copy of everything a side panel shows.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            lines: self.lines,
            combo: self.combo,
            pieces_locked: self.pieces_locked,
            fall_delay_ms: self.fall_delay_ms,
            hold: self.hold.piece(),
            can_hold: self.hold.can_swap(),
            queue: self.queue.iter().copied().collect(),
            active: self.piece.is_live().then(|| ActiveSnapshot {
                config: self.piece.config(),
                x: self.piece.position().0,
                y: self.piece.position().1,
            }),
            ghost_y: self.ghost().map(|(_, y)| y),
            game_over: self.game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingAudio, RecordingSink, ScriptedInput};
    use crate::types::{PieceKind, Rotation};

    fn session(seed: u32) -> Session {
        Session::new(Arc::new(SchemeTable::builtin().unwrap()), Tuning::default(), seed)
    }

    #[test]
    fn new_session_has_live_piece_and_full_queue() {
        let s = session(1);
        assert!(s.piece().is_live());
        assert_eq!(s.queue().len(), QUEUE_LEN);
        assert_eq!(s.piece().position(), (SPAWN_X, SPAWN_Y));
        assert!(!s.game_over());
    }

    #[test]
    fn pressed_left_moves_once_then_repeats_after_charge() {
        let mut s = session(2);
        let mut audio = RecordingAudio::new();
        let mut input = ScriptedInput::new();
        let x0 = s.piece().position().0;

        input.press(Command::MoveLeft);
        s.handle_input(&input, &mut audio);
        assert_eq!(s.piece().position().0, x0 - 1);
        input.end_frame();

        // Still inside the charge window.
        s.handle_input(&input, &mut audio);
        s.piece.auto_move(&s.field, 100);
        assert_eq!(s.piece().position().0, x0 - 1);

        // 50ms finishes the charge, then 15 cells/s for 100ms is one step.
        s.piece.auto_move(&s.field, 150);
        assert_eq!(s.piece().position().0, x0 - 2);
        assert!(audio.contains(SoundEvent::Move));
    }

    #[test]
    fn hard_drop_locks_in_same_tick() {
        let mut s = session(3);
        let mut audio = RecordingAudio::new();
        let mut input = ScriptedInput::new();
        input.press(Command::HardDrop);
        s.handle_input(&input, &mut audio);
        s.do_logic(16, &mut audio);

        assert_eq!(s.pieces_locked(), 1);
        assert_eq!(s.field().block_count(), 4);
        assert!(audio.contains(SoundEvent::Drop));
        assert!(audio.contains(SoundEvent::Lock));
        assert!(s.piece().is_live());
        assert_eq!(s.fall_delay_ms(), INITIAL_FALL_DELAY_MS - FALL_DELAY_STEP_MS);
    }

    #[test]
    fn hold_request_applies_on_next_logic_tick() {
        let mut s = session(4);
        let mut audio = RecordingAudio::new();
        let mut input = ScriptedInput::new();
        let current = s.piece().config();
        let next = s.queue().peek();

        input.press(Command::Hold);
        s.handle_input(&input, &mut audio);
        assert!(s.swap_pending());
        s.do_logic(0, &mut audio);

        assert_eq!(s.hold().piece(), Some(current));
        assert_eq!(Some(s.piece().config()), next);
        assert!(audio.contains(SoundEvent::Swap));
        assert_eq!(s.queue().len(), QUEUE_LEN);
    }

    #[test]
    fn double_swap_is_noop() {
        let mut s = session(5);
        let mut audio = RecordingAudio::new();
        assert!(s.swap(&mut audio));
        let hold = s.hold().piece();
        let active = s.piece().config();
        let queue: Vec<_> = s.queue().iter().copied().collect();

        assert!(!s.swap(&mut audio));
        assert_eq!(s.hold().piece(), hold);
        assert_eq!(s.piece().config(), active);
        assert_eq!(s.queue().iter().copied().collect::<Vec<_>>(), queue);
    }

    #[test]
    fn swap_back_returns_original_piece() {
        let mut s = session(6);
        let mut audio = RecordingAudio::new();
        let first = s.piece().config();
        assert!(s.swap(&mut audio));

        // Lock the second piece to re-enable the slot.
        let (piece, field) = s.piece_mut();
        piece.drop(field);
        piece.expire_fall_timer();
        s.do_logic(0, &mut audio);
        let third = s.piece().config();

        assert!(s.swap(&mut audio));
        assert_eq!(s.piece().config(), first);
        assert_eq!(s.hold().piece(), Some(third));
    }

    #[test]
    fn single_clear_scores_and_increments_combo() {
        let mut s = session(7);
        let mut audio = RecordingAudio::new();
        *s.field_mut() = Field::from_rows(&["IIII.IIIII"]).unwrap();

        // Drop a vertical I into the gap at column 4.
        let (piece, field) = s.piece_mut();
        piece.spawn(field, 2, 0, 1000, PieceConfig::new(PieceKind::I, Rotation::East));
        piece.drop(field);
        piece.expire_fall_timer();
        s.do_logic(0, &mut audio);

        let event = s.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.points, 1000);
        assert_eq!(s.score(), 1000);
        assert_eq!(s.combo(), 1);
        assert_eq!(s.lines(), 1);
        assert_eq!(s.field().block_count(), 3);
        assert!(audio.contains(SoundEvent::Single));
        assert!(s.take_last_event().is_none());
    }

    #[test]
    fn no_clear_lock_resets_combo() {
        let mut s = session(8);
        let mut audio = RecordingAudio::new();
        s.combo = 3;
        let (piece, field) = s.piece_mut();
        piece.drop(field);
        piece.expire_fall_timer();
        s.do_logic(0, &mut audio);
        assert_eq!(s.combo(), 0);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn blocked_spawn_ends_session() {
        let mut s = session(9);
        let mut audio = RecordingAudio::new();
        for x in 0..10 {
            for y in 0..4 {
                s.field_mut().add_block(x, y, PieceKind::Z);
            }
        }
        let blocks = s.field().block_count();
        assert!(!s.spawn_next(&mut audio));
        assert!(s.game_over());
        assert_eq!(s.field().block_count(), blocks);
        assert!(audio.contains(SoundEvent::GameOver));

        // Frozen from now on.
        s.do_logic(10_000, &mut audio);
        assert_eq!(s.field().block_count(), blocks);
        assert!(!s.swap(&mut audio));
    }

    #[test]
    fn lock_above_the_top_ends_session_without_spawning() {
        let mut s = session(14);
        let mut audio = RecordingAudio::new();
        s.field_mut().add_block(SPAWN_X + 1, 0, PieceKind::Z);
        s.field_mut().add_block(SPAWN_X + 2, 0, PieceKind::Z);
        let upcoming: Vec<_> = s.queue().iter().copied().collect();

        // An O resting on row 0 with both of its rows above the field.
        let (piece, field) = s.piece_mut();
        assert!(piece.spawn(field, SPAWN_X, -2, 1000, PieceConfig::new(PieceKind::O, Rotation::North)));
        piece.expire_fall_timer();
        s.do_logic(0, &mut audio);

        let event = s.take_last_event().unwrap();
        assert!(event.lock_out);
        assert_eq!(event.lines_cleared, 0);
        assert!(s.game_over());
        assert!(!s.piece().is_live());
        assert_eq!(s.pieces_locked(), 1);
        assert_eq!(s.field().block_count(), 2);
        assert_eq!(s.queue().iter().copied().collect::<Vec<_>>(), upcoming);
        assert!(audio.contains(SoundEvent::GameOver));
    }

    #[test]
    fn held_shift_carries_into_next_piece_without_charge() {
        let mut s = session(15);
        let mut audio = RecordingAudio::new();
        let mut input = ScriptedInput::new();

        // Left is kept down from earlier frames while the piece hard drops.
        input.hold(Command::MoveLeft).press(Command::HardDrop);
        s.handle_input(&input, &mut audio);
        s.do_logic(0, &mut audio);
        assert_eq!(s.pieces_locked(), 1);
        assert_eq!(s.piece().position(), (SPAWN_X, SPAWN_Y));
        assert_eq!(s.piece().shift_repeat().velocity(), -SHIFT_VELOCITY);

        // Still held: no instant move on the new piece.
        input.end_frame();
        s.handle_input(&input, &mut audio);
        assert_eq!(s.piece().position(), (SPAWN_X, SPAWN_Y));

        // 15 cells/s over 67ms is one step, well inside the 150ms charge.
        s.do_logic(67, &mut audio);
        assert_eq!(s.piece().position(), (SPAWN_X - 1, SPAWN_Y));
    }

    #[test]
    fn fall_delay_reaches_floor() {
        let mut s = session(10);
        s.fall_delay_ms = MIN_FALL_DELAY_MS + 1;
        let mut audio = RecordingAudio::new();
        let (piece, field) = s.piece_mut();
        piece.drop(field);
        piece.expire_fall_timer();
        s.do_logic(0, &mut audio);
        assert_eq!(s.fall_delay_ms(), MIN_FALL_DELAY_MS);
    }

    #[test]
    fn render_draws_active_ghost_and_previews() {
        let s = session(11);
        let mut sink = RecordingSink::new();
        s.render(&mut sink);
        assert_eq!(sink.count(BlockStyle::Active), 4);
        assert_eq!(sink.count(BlockStyle::Ghost), 4);
        assert_eq!(sink.count(BlockStyle::Locked), 0);
        assert_eq!(sink.previews.len(), QUEUE_LEN);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let s = session(12);
        let snap = s.snapshot();
        assert_eq!(snap.queue.len(), QUEUE_LEN);
        assert_eq!(snap.active.map(|a| a.config), Some(s.piece().config()));
        assert!(snap.can_hold);
        assert!(!snap.game_over);
    }
}

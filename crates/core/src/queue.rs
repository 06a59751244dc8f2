//! Queue module - lookahead queue and hold slot
//!
//! The queue is kept at a fixed length: every spawn takes the head and pushes
//! one fresh random config to the tail. A hold exchange re-inserts a piece
//! itself, so the refill that follows it is skipped exactly once.
//!
//! Lengths are clamped to `1..=QUEUE_LEN` so the entries fit inline. A swap
//! may hold one extra entry until the next spawn.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{PieceConfig, QUEUE_LEN};

type Entries = ArrayVec<PieceConfig, { QUEUE_LEN + 1 }>;

/// Ordered lookahead of upcoming piece configurations.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    entries: Entries,
    len: usize,
    rng: SimpleRng,
    skip_refill: bool,
}

impl PieceQueue {
    /// Create a queue of `len` random configs, clamped to `1..=QUEUE_LEN`.
    pub fn new(len: usize, seed: u32) -> Self {
        let len = len.clamp(1, QUEUE_LEN);
        let mut rng = SimpleRng::new(seed);
        let entries = (0..len).map(|_| rng.next_config()).collect();
        Self {
            entries,
            len,
            rng,
            skip_refill: false,
        }
    }

    /// Configured minimum length.
    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next piece without consuming it.
    pub fn peek(&self) -> Option<PieceConfig> {
        self.entries.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceConfig> {
        self.entries.iter()
    }

    /// Take the head for a spawn and refill the tail, unless a hold exchange
    /// already supplied the replacement.
    pub fn pop(&mut self) -> PieceConfig {
        let head = if self.entries.is_empty() {
            self.rng.next_config()
        } else {
            self.entries.remove(0)
        };
        if self.skip_refill {
            self.skip_refill = false;
        } else {
            self.push_random();
        }
        while self.entries.len() < self.len {
            self.push_random();
        }
        head
    }

    /// Make `config` the immediate next piece (hold content coming back).
    pub fn push_front(&mut self, config: PieceConfig) {
        if self.entries.is_full() {
            self.entries.pop();
        }
        self.entries.insert(0, config);
    }

    /// Pad the tail with a fresh random config.
    pub fn push_random(&mut self) {
        let config = self.rng.next_config();
        // A full queue already has its lookahead.
        let _ = self.entries.try_push(config);
    }

    /// Skip the refill of the next `pop`.
    pub fn skip_next_refill(&mut self) {
        self.skip_refill = true;
    }

    pub fn refill_skipped(&self) -> bool {
        self.skip_refill
    }
}

/// Single hold slot with the once-per-piece lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hold {
    piece: Option<PieceConfig>,
    locked: bool,
}

impl Hold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn piece(&self) -> Option<PieceConfig> {
        self.piece
    }

    /// Whether a swap is allowed for the current piece.
    pub fn can_swap(&self) -> bool {
        !self.locked
    }

    /// Store `config`, returning the previous content. Locks the slot until
    /// [`Hold::unlock`] is called.
    pub fn exchange(&mut self, config: PieceConfig) -> Option<PieceConfig> {
        self.locked = true;
        self.piece.replace(config)
    }

    /// Called when a piece locks into the field.
    pub fn unlock(&mut self) {
        self.locked = false;
    }
}

/// Exchange the active `current` config with the hold slot.
///
/// Afterwards the head of the queue is the piece to spawn and the refill of
/// that spawn is skipped. Returns `false` (and changes nothing) when the hold
/// slot is locked for this piece.
pub fn swap(queue: &mut PieceQueue, hold: &mut Hold, current: PieceConfig) -> bool {
    if !hold.can_swap() {
        return false;
    }
    match hold.exchange(current) {
        Some(previous) => queue.push_front(previous),
        None => queue.push_random(),
    }
    queue.skip_next_refill();
    true
}

//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (simulation, terminal rendering, input mapping).
//!
//! # Field Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, top to bottom)
//! - **Spawn position**: (3, 0), the top-left corner of the piece's 4x4 box
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host frame interval (~60 FPS) |
//! | `INITIAL_FALL_DELAY_MS` | 1000 | Fall delay of the first piece |
//! | `FALL_DELAY_STEP_MS` | 4 | Fall delay decrease per locked piece |
//! | `MIN_FALL_DELAY_MS` | 100 | Fall delay floor |
//! | `SOFT_DROP_FACTOR` | 10 | Soft drop divides the fall delay |
//! | `REPEAT_DELAY_MS` | 150 | Held-key charge before auto-repeat |
//! | `GAME_OVER_GRACE_MS` | 1500 | Pause between game over and results |
//!
//! # Examples
//!
//! ```
//! use splitris_types::{PieceKind, Rotation, Command, FIELD_WIDTH, FIELD_HEIGHT};
//!
//! let piece = PieceKind::T;
//! assert_eq!(PieceKind::from_str("t"), Some(piece));
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Rotation::North.turned(-1), Rotation::West);
//!
//! assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
//!
//! assert_eq!(FIELD_WIDTH, 10);
//! assert_eq!(FIELD_HEIGHT, 20);
//! ```

/// Field width in cells (10 columns)
pub const FIELD_WIDTH: u8 = 10;

/// Field height in cells (20 rows)
pub const FIELD_HEIGHT: u8 = 20;

/// Side length of the square occupancy mask of every piece.
pub const SCHEME_SIZE: usize = 4;

/// Number of upcoming pieces kept in the lookahead queue.
pub const QUEUE_LEN: usize = 4;

/// Spawn column: the piece box is centered horizontally.
pub const SPAWN_X: i8 = (FIELD_WIDTH as i8 - SCHEME_SIZE as i8) / 2;

/// Spawn row: top of the field.
pub const SPAWN_Y: i8 = 0;

/// Host frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Fall delay of the first piece of a session.
pub const INITIAL_FALL_DELAY_MS: u32 = 1000;

/// Amount the fall delay shrinks after every locked piece.
pub const FALL_DELAY_STEP_MS: u32 = 4;

/// The fall delay never drops below this floor.
pub const MIN_FALL_DELAY_MS: u32 = 100;

/// Soft drop divides the effective fall delay by this factor.
pub const SOFT_DROP_FACTOR: u32 = 10;

/// Held-key charge time before auto-repeat starts.
pub const REPEAT_DELAY_MS: u32 = 150;

/// Horizontal auto-repeat rate in cells per second.
pub const SHIFT_VELOCITY: i32 = 15;

/// Rotational auto-repeat rate in quarter turns per second.
pub const ROTATE_VELOCITY: i32 = 4;

/// Velocity accumulator threshold: one step per 1000 velocity-milliseconds.
pub const REPEAT_UNIT: i32 = 1000;

/// Delay between the last session topping out and the results screen.
pub const GAME_OVER_GRACE_MS: u32 = 1500;

/// Maximum number of split-screen players.
pub const MAX_PLAYERS: usize = 4;

/// Points per cleared line.
pub const LINE_POINTS: u32 = 1000;

/// Points per step of the combo counter held before the clear.
pub const COMBO_POINTS: u32 = 1500;

/// Flat bonus for clearing four lines at once.
pub const TETRIS_BONUS: u32 = 1000;


/// The seven tetrimino piece kinds
///
/// The declaration order is the order of the blocks in the scheme resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    T,
    L,
    J,
    S,
    Z,
    O,
}

impl PieceKind {
    /// All kinds in scheme order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::O,
    ];

    /// Position of this kind in [`PieceKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`PieceKind::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use splitris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "t" => Some(PieceKind::T),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "o" => Some(PieceKind::O),
            _ => None,
        }
    }

    /// Convert to uppercase letter (used by previews and logs)
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::T => "T",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::O => "O",
        }
    }
}

/// Rotation states, clockwise from the spawn orientation
///
/// - **North**: 0°
/// - **East**: 90°
/// - **South**: 180°
/// - **West**: 270°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// All rotations in scheme order.
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Rotate by `direction` quarter turns (positive = clockwise), modulo 4.
    ///
    /// ```
    /// use splitris_types::Rotation;
    ///
    /// assert_eq!(Rotation::West.turned(1), Rotation::North);
    /// assert_eq!(Rotation::North.turned(-1), Rotation::West);
    /// assert_eq!(Rotation::East.turned(6), Rotation::West);
    /// ```
    pub fn turned(self, direction: i8) -> Self {
        let idx = (self.index() as i32 + direction as i32).rem_euclid(4) as usize;
        Self::ALL[idx]
    }

    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        self.turned(1)
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        self.turned(-1)
    }

    /// Orientation in degrees.
    pub fn degrees(&self) -> u16 {
        self.index() as u16 * 90
    }
}

/// Which piece, which orientation.
///
/// Stored in the lookahead queue and the hold slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceConfig {
    pub kind: PieceKind,
    pub rotation: Rotation,
}

impl PieceConfig {
    pub const fn new(kind: PieceKind, rotation: Rotation) -> Self {
        Self { kind, rotation }
    }
}

/// Player commands
///
/// Edge events (`pressed`) trigger the instant action; the held state of the
/// directional and rotation commands drives auto-repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Shift piece one cell left
    MoveLeft,
    /// Shift piece one cell right
    MoveRight,
    /// Accelerate falling while held
    SoftDrop,
    /// Drop piece to the lowest reachable row and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Exchange the active piece with the hold slot
    Hold,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::HardDrop,
        Command::RotateCw,
        Command::RotateCcw,
        Command::Hold,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse command from string
    ///
    /// # Examples
    ///
    /// ```
    /// use splitris_types::Command;
    ///
    /// assert_eq!(Command::from_str("moveLeft"), Some(Command::MoveLeft));
    /// assert_eq!(Command::from_str("rotateCw"), Some(Command::RotateCw));
    /// assert_eq!(Command::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "softdrop" => Some(Command::SoftDrop),
            "harddrop" => Some(Command::HardDrop),
            "rotatecw" => Some(Command::RotateCw),
            "rotateccw" => Some(Command::RotateCcw),
            "hold" => Some(Command::Hold),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::SoftDrop => "softDrop",
            Command::HardDrop => "hardDrop",
            Command::RotateCw => "rotateCw",
            Command::RotateCcw => "rotateCcw",
            Command::Hold => "hold",
        }
    }
}

/// Named audio notifications fired by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    /// Piece shifted one cell
    Move,
    /// Piece rotated
    Rotate,
    /// Shift or rotation rejected
    Blocked,
    /// Piece moved one row down by gravity
    FallStep,
    /// Hard drop
    Drop,
    /// Piece locked into the field
    Lock,
    /// One line cleared
    Single,
    /// Two lines cleared
    Double,
    /// Three lines cleared
    Triple,
    /// Four lines cleared
    Tetris,
    /// Hold exchange
    Swap,
    /// Top-out
    GameOver,
}

impl SoundEvent {
    /// Line-clear tier for `lines` cleared rows (1-4).
    pub fn for_clear(lines: u32) -> Option<Self> {
        match lines {
            1 => Some(SoundEvent::Single),
            2 => Some(SoundEvent::Double),
            3 => Some(SoundEvent::Triple),
            4 => Some(SoundEvent::Tetris),
            _ => None,
        }
    }
}

/// A cell on the field
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Locked block, tagged with the piece kind it came from
pub type Cell = Option<PieceKind>;

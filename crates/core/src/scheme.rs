//! Scheme module - piece occupancy masks
//!
//! Every piece kind has four rotations, each a 4x4 occupancy mask. The masks are
//! read once from a whitespace separated text resource of 7 x 4 x 4 x 4 integers
//! (kind x rotation x row x column, each `0` or `1`) and are read-only afterwards.
//! Row 0 is the top of the piece box, matching field coordinates where `y` grows
//! downward.
//!
//! The table is an ordinary value: load it at startup and share it by reference
//! (or `Arc`) with every tetrimino that needs it.

use std::fmt;
use std::path::Path;

use arrayvec::ArrayVec;

use crate::types::{PieceConfig, PieceKind, Rotation, SCHEME_SIZE};

/// The scheme resource shipped with the game.
pub const BUILTIN_SCHEMES: &str = include_str!("../../../assets/schemes.txt");

/// Number of integers a complete scheme resource holds.
pub const SCHEME_TOKENS: usize =
    PieceKind::ALL.len() * Rotation::ALL.len() * SCHEME_SIZE * SCHEME_SIZE;

/// A 4x4 occupancy mask indexed `[row][col]`.
pub type Mask = [[bool; SCHEME_SIZE]; SCHEME_SIZE];

/// Offset of a single block relative to the piece box, as `(col, row)`.
pub type BlockOffset = (i8, i8);

/// Occupied offsets of one mask, in row-major order.
pub type Footprint = ArrayVec<BlockOffset, { SCHEME_SIZE * SCHEME_SIZE }>;

/// Failure to build a [`SchemeTable`] from a resource.
#[derive(Debug)]
pub enum SchemeError {
    /// The resource could not be read.
    Io { path: String, source: std::io::Error },
    /// A token is not an integer.
    BadToken { index: usize, token: String },
    /// An integer other than 0 or 1.
    BadValue { index: usize, value: i64 },
    /// Fewer than [`SCHEME_TOKENS`] integers.
    Truncated { found: usize },
    /// More than [`SCHEME_TOKENS`] integers.
    TrailingData { index: usize },
    /// A mask with no occupied cell.
    EmptyMask { kind: PieceKind, rotation: Rotation },
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeError::Io { path, source } => {
                write!(f, "could not open \"{}\": {}", path, source)
            }
            SchemeError::BadToken { index, token } => {
                write!(f, "token {} is not an integer: {:?}", index, token)
            }
            SchemeError::BadValue { index, value } => {
                write!(f, "token {} must be 0 or 1, got {}", index, value)
            }
            SchemeError::Truncated { found } => {
                write!(f, "expected {} integers, found {}", SCHEME_TOKENS, found)
            }
            SchemeError::TrailingData { index } => {
                write!(f, "unexpected data after {} integers (token {})", SCHEME_TOKENS, index)
            }
            SchemeError::EmptyMask { kind, rotation } => {
                write!(f, "{} mask for rotation {} has no blocks", kind.as_str(), rotation.index())
            }
        }
    }
}

impl std::error::Error for SchemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemeError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Immutable table of occupancy masks for every kind and rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeTable {
    masks: [[Mask; 4]; 7],
}

impl SchemeTable {
    /// Parse the built-in resource.
    ///
    /// The embedded resource is covered by tests, so this only fails if the
    /// asset shipped with the crate is corrupted.
    pub fn builtin() -> Result<Self, SchemeError> {
        Self::parse(BUILTIN_SCHEMES)
    }

    /// Read and parse a resource file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse resource text.
    pub fn parse(text: &str) -> Result<Self, SchemeError> {
        let mut masks = [[[[false; SCHEME_SIZE]; SCHEME_SIZE]; 4]; 7];
        let mut count = 0usize;

        for (index, token) in text.split_whitespace().enumerate() {
            if index >= SCHEME_TOKENS {
                return Err(SchemeError::TrailingData { index });
            }
            let value: i64 = token.parse().map_err(|_| SchemeError::BadToken {
                index,
                token: token.to_string(),
            })?;
            let occupied = match value {
                0 => false,
                1 => true,
                _ => return Err(SchemeError::BadValue { index, value }),
            };

            let cells = SCHEME_SIZE * SCHEME_SIZE;
            let kind = index / (4 * cells);
            let rot = (index / cells) % 4;
            let row = (index / SCHEME_SIZE) % SCHEME_SIZE;
            let col = index % SCHEME_SIZE;
            masks[kind][rot][row][col] = occupied;
            count += 1;
        }

        if count < SCHEME_TOKENS {
            return Err(SchemeError::Truncated { found: count });
        }

        for kind in PieceKind::ALL {
            for rotation in Rotation::ALL {
                let mask = &masks[kind.index()][rotation.index()];
                if !mask.iter().flatten().any(|&c| c) {
                    return Err(SchemeError::EmptyMask { kind, rotation });
                }
            }
        }

        Ok(Self { masks })
    }

    /// The 4x4 mask of `kind` in `rotation`.
    pub fn shape_mask(&self, kind: PieceKind, rotation: Rotation) -> &Mask {
        &self.masks[kind.index()][rotation.index()]
    }

    /// Occupied `(col, row)` offsets of a configuration.
    pub fn footprint(&self, config: PieceConfig) -> Footprint {
        let mut out = Footprint::new();
        let mask = self.shape_mask(config.kind, config.rotation);
        for (row, cols) in mask.iter().enumerate() {
            for (col, &occupied) in cols.iter().enumerate() {
                if occupied {
                    out.push((col as i8, row as i8));
                }
            }
        }
        out
    }

    /// Number of occupied rows of a configuration's mask.
    pub fn rows_used(&self, config: PieceConfig) -> usize {
        self.shape_mask(config.kind, config.rotation)
            .iter()
            .filter(|cols| cols.iter().any(|&c| c))
            .count()
    }
}

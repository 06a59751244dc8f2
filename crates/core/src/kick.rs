//! Wall-kick offsets tried when a rotation is blocked in place.
//!
//! A kick table is an ordered list of `(dx, dy)` translations (`dy` positive is
//! down). The first offset at which the rotated piece fits is committed. The
//! table is plain configuration; sessions take it from [`crate::Tuning`].

/// Ordered rotation fallback offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickTable {
    offsets: &'static [(i8, i8)],
}

/// Single-cell shifts, then two-cell shifts, then diagonals.
const STANDARD: [(i8, i8); 12] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

impl KickTable {
    /// The canonical table.
    pub const STANDARD: KickTable = KickTable { offsets: &STANDARD };

    /// Single-cell shifts only (no two-cell or diagonal kicks).
    pub const SINGLE_CELL: KickTable = KickTable {
        offsets: &[(-1, 0), (1, 0), (0, -1), (0, 1)],
    };

    /// Rotation never moves the piece.
    pub const NONE: KickTable = KickTable { offsets: &[] };

    pub const fn new(offsets: &'static [(i8, i8)]) -> Self {
        Self { offsets }
    }

    pub fn offsets(&self) -> &'static [(i8, i8)] {
        self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl Default for KickTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

//! Field module - manages the playfield grid
//!
//! The field is a 10x20 grid where each cell is either empty or holds a locked
//! block tagged with the kind of piece it came from. Storage is a flat array
//! owned by value, so locking and clearing never allocate.
//!
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top
//! to bottom). Collision queries treat columns outside `0..width` and rows at or
//! below `height` as walls, while rows above the top (`y < 0`) are open space.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, FIELD_HEIGHT, FIELD_WIDTH};

const WIDTH: usize = FIELD_WIDTH as usize;
const HEIGHT: usize = FIELD_HEIGHT as usize;

/// Total number of cells on the field
const FIELD_SIZE: usize = WIDTH * HEIGHT;

/// Row indices removed by one clearing pass, bottom to top.
pub type ClearedRows = ArrayVec<usize, HEIGHT>;

/// The playfield - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; FIELD_SIZE],
}

impl Field {
    /// Create a new empty field
    pub fn new() -> Self {
        Self {
            cells: [None; FIELD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= FIELD_WIDTH as i8 || y < 0 || y >= FIELD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        FIELD_WIDTH
    }

    pub fn height(&self) -> u8 {
        FIELD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Collision query used by the piece routines.
    ///
    /// Side walls and the floor count as blocks; the open space above the
    /// field does not.
    pub fn has_block(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= FIELD_WIDTH as i8 || y >= FIELD_HEIGHT as i8 {
            return true;
        }
        if y < 0 {
            return false;
        }
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Occupy a cell with a locked block.
    ///
    /// Callers check legality first; a position outside the grid is ignored
    /// and reported as `false`.
    pub fn add_block(&mut self, x: i8, y: i8, tag: PieceKind) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = Some(tag);
                true
            }
            None => false,
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|cell| cell.is_some())
    }

    /// Check if a row has no blocks at all
    pub fn is_row_empty(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return true;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|cell| cell.is_none())
    }

    /// Remove every full row and compact the rest downward.
    ///
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> u32 {
        self.clear_full_rows().len() as u32
    }

    /// Remove every full row and return the removed row indices (bottom to top).
    ///
    /// Single pass two-pointer compaction: rows are read bottom to top and each
    /// surviving row is copied down by the number of full rows found below it.
    /// Rows left over at the top are emptied.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let mut write_y = HEIGHT;

        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * WIDTH;
                    let dst_start = write_y * WIDTH;
                    self.cells.copy_within(src_start..src_start + WIDTH, dst_start);
                }
            }
        }

        for cell in &mut self.cells[..write_y * WIDTH] {
            *cell = None;
        }

        cleared_rows
    }

    /// Number of occupied cells.
    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Number of rows holding at least one block.
    pub fn occupied_rows(&self) -> usize {
        (0..HEIGHT).filter(|&y| !self.is_row_empty(y)).count()
    }

    /// Get a reference to the internal cells array (row-major)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(x, y, kind)` for every locked block.
    pub fn blocks(&self) -> impl Iterator<Item = (i8, i8, PieceKind)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            cell.map(|kind| ((idx % WIDTH) as i8, (idx / WIDTH) as i8, kind))
        })
    }

    /// Empty the whole field
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a field from text rows, top to bottom, for tests and demos.
    ///
    /// Each row is `WIDTH` characters: `.` is empty, a piece letter is a block.
    /// Missing top rows are empty.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        if rows.len() > HEIGHT {
            return None;
        }
        let mut field = Self::new();
        let offset = HEIGHT - rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.chars().count() != WIDTH {
                return None;
            }
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind = PieceKind::from_str(&ch.to_string())?;
                field.add_block(x as i8, (offset + i) as i8, kind);
            }
        }
        Some(field)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

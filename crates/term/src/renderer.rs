//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after a resize) is a full redraw; after that
//! only runs of changed cells are written.

use std::io::{self, Write};
use std::ops::Range;

use anyhow::{Context, Result};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    releases_enabled: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            releases_enabled: false,
        }
    }

    /// Switch to raw mode on the alternate screen.
    ///
    /// When `report_releases` is set the terminal is asked for key release
    /// events; not every terminal supports it.
    pub fn enter(&mut self, report_releases: bool) -> Result<()> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        if report_releases {
            self.buf.queue(event::PushKeyboardEnhancementFlags(
                event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
            self.releases_enabled = true;
        }
        self.flush_buf()?;
        Ok(())
    }

    /// Whether key release reporting was requested on `enter`.
    pub fn releases_enabled(&self) -> bool {
        self.releases_enabled
    }

    /// Ring the terminal bell.
    pub fn bell(&mut self) -> Result<()> {
        self.stdout.write_all(b"\x07")?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        if self.releases_enabled {
            self.buf.queue(event::PopKeyboardEnhancementFlags)?;
            self.releases_enabled = false;
        }
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers should keep one `FrameBuffer` and pass it in every frame.
    /// The renderer will diff against the previous frame and then swap buffers
    /// so the caller can reuse the old one without cloning.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        // Take previous out to avoid borrow conflicts (no cloning).
        let (mut prev, needs_full) = match self.last.take() {
            Some(prev) => {
                let resized = prev.width() != fb.width() || prev.height() != fb.height();
                (prev, resized)
            }
            None => (FrameBuffer::new(fb.width(), fb.height()), true),
        };

        if needs_full {
            self.buf.clear();
            encode_full_into(fb, &mut self.buf)?;
            self.flush_buf()?;
            prev.resize(fb.width(), fb.height());
        } else {
            self.buf.clear();
            encode_diff_into(&prev, fb, &mut self.buf)?;
            self.flush_buf()?;
        }

        // Swap current into prev so next frame can diff without cloning.
        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Writes cells as crossterm commands, emitting a style only when it differs
/// from the previous cell's.
struct Encoder<'a> {
    out: &'a mut Vec<u8>,
    style: Option<CellStyle>,
}

impl<'a> Encoder<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, style: None }
    }

    fn move_to(&mut self, x: u16, y: u16) -> Result<()> {
        self.out.queue(cursor::MoveTo(x, y))?;
        Ok(())
    }

    fn cells(&mut self, cells: &[Cell]) -> Result<()> {
        for cell in cells {
            if self.style != Some(cell.style) {
                self.set_style(cell.style)?;
            }
            self.out.queue(Print(cell.ch))?;
        }
        Ok(())
    }

    fn set_style(&mut self, style: CellStyle) -> Result<()> {
        // Reset first: bold and dim cannot be switched off individually.
        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(SetForegroundColor(color(style.fg)))?;
        self.out.queue(SetBackgroundColor(color(style.bg)))?;
        if style.bold {
            self.out.queue(SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            self.out.queue(SetAttribute(Attribute::Dim))?;
        }
        self.style = Some(style);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn rows(fb: &FrameBuffer) -> impl Iterator<Item = &[Cell]> {
    fb.cells().chunks(fb.width().max(1) as usize)
}

/// Encode a full-frame redraw into `out` without touching stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut enc = Encoder::new(out);
    enc.move_to(0, 0)?;
    for (y, row) in rows(fb).enumerate() {
        if y > 0 {
            enc.out.queue(Print("\r\n"))?;
        }
        enc.cells(row)?;
    }
    enc.finish()
}

/// Encode only the runs of cells that differ from `prev`.
///
/// A size mismatch rewrites every row.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let same_size = prev.width() == next.width() && prev.height() == next.height();
    let mut enc = Encoder::new(out);

    for (y, row) in rows(next).enumerate() {
        let y = y as u16;
        if !same_size {
            enc.move_to(0, y)?;
            enc.cells(row)?;
            continue;
        }
        let start = y as usize * row.len();
        let old = &prev.cells()[start..start + row.len()];
        for run in changed_runs(old, row) {
            enc.move_to(run.start as u16, y)?;
            enc.cells(&row[run])?;
        }
    }
    enc.finish()
}

/// Maximal ranges where `prev` and `next` differ. Both rows have equal length.
fn changed_runs<'a>(prev: &'a [Cell], next: &'a [Cell]) -> impl Iterator<Item = Range<usize>> + 'a {
    let mut x = 0;
    std::iter::from_fn(move || {
        let start = x + prev[x..].iter().zip(&next[x..]).position(|(a, b)| a != b)?;
        let len = prev[start..]
            .iter()
            .zip(&next[start..])
            .take_while(|(a, b)| a != b)
            .count();
        x = start + len;
        Some(start..x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_encode_contains_every_glyph() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.put_str(0, 0, "AB", CellStyle::default());
        fb.put_str(0, 1, "CD", CellStyle::default());

        let mut out = Vec::new();
        encode_full_into(&fb, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("AB"));
        assert!(text.contains("CD"));
    }

    #[test]
    fn unchanged_frame_encodes_no_glyphs() {
        let mut a = FrameBuffer::new(4, 2);
        a.put_str(0, 0, "WXYZ", CellStyle::default());
        let b = a.clone();

        let mut out = Vec::new();
        encode_diff_into(&a, &b, &mut out).unwrap();
        assert!(!String::from_utf8_lossy(&out).contains('W'));
    }

    #[test]
    fn diff_writes_only_changed_cells() {
        let a = FrameBuffer::new(6, 2);
        let mut b = a.clone();
        b.put_str(2, 1, "Q", CellStyle::default());

        let mut out = Vec::new();
        encode_diff_into(&a, &b, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches('Q').count(), 1);
        // MoveTo(2, 1) is "ESC[2;3H" (1-based row;col).
        assert!(text.contains("\x1b[2;3H"));
    }

    #[test]
    fn changed_runs_coalesce_adjacent_cells() {
        let a = [Cell::default(); 7];
        let mut b = a;
        for x in [1, 2, 3, 5] {
            b[x].ch = 'X';
        }
        let runs: Vec<_> = changed_runs(&a, &b).collect();
        assert_eq!(runs, vec![1..4, 5..6]);
        assert_eq!(changed_runs(&a, &a).count(), 0);
    }
}

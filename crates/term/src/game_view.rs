//! GameView: maps running sessions into a terminal framebuffer.
//!
//! Each player gets a bordered field with a side panel (score, lines, combo,
//! hold and next pieces). Players are laid out left to right; when the
//! terminal is too narrow for two columns per cell the view falls back to one.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{BlockSink, BlockStyle, Mask, PreviewSlot, Session};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceConfig, PieceKind, FIELD_HEIGHT, FIELD_WIDTH, QUEUE_LEN};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// What to draw for one player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerPanel<'a> {
    pub name: &'a str,
    pub session: &'a Session,
    /// Short-lived message from the last lock ("Tetris!", "Combo x2").
    pub message: Option<&'a str>,
}

/// Width of the side panel in columns.
const PANEL_W: u16 = 12;
/// Gap between players.
const GAP_W: u16 = 2;

const FIELD_BG: Rgb = Rgb::new(30, 30, 40);

/// Split-screen renderer for the play state.
pub struct GameView {
    /// Preferred field cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
        }
    }

    fn player_width(cell_w: u16) -> u16 {
        FIELD_WIDTH as u16 * cell_w + 2 + 1 + PANEL_W
    }

    /// Cell width actually used for `players` players in `viewport`.
    pub fn cell_width_for(&self, players: usize, viewport: Viewport) -> u16 {
        let players = players.max(1) as u16;
        let needed = |cell_w: u16| players * Self::player_width(cell_w) + (players - 1) * GAP_W;
        if needed(self.cell_w) <= viewport.width {
            self.cell_w
        } else {
            1
        }
    }

    /// Render every player's session into an existing framebuffer.
    pub fn render_into(
        &self,
        panels: &[PlayerPanel<'_>],
        paused: bool,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let cell_w = self.cell_width_for(panels.len(), viewport);
        let player_w = Self::player_width(cell_w);
        let count = panels.len() as u16;
        let total_w = count * player_w + count.saturating_sub(1) * GAP_W;
        let frame_h = FIELD_HEIGHT as u16 + 2;

        let start_x = viewport.width.saturating_sub(total_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h + 1) / 2;

        for (i, panel) in panels.iter().enumerate() {
            let x = start_x + i as u16 * (player_w + GAP_W);
            self.render_player(fb, panel, x, start_y, cell_w, paused);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, panels: &[PlayerPanel<'_>], paused: bool, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(panels, paused, viewport, &mut fb);
        fb
    }

    fn render_player(
        &self,
        fb: &mut FrameBuffer,
        panel: &PlayerPanel<'_>,
        x: u16,
        y: u16,
        cell_w: u16,
        paused: bool,
    ) {
        let frame_w = FIELD_WIDTH as u16 * cell_w + 2;
        let frame_h = FIELD_HEIGHT as u16 + 2;
        let label = CellStyle::default().bold();

        fb.put_str_centered(x, frame_w, y, panel.name, label);
        let field_y = y + 1;

        // Background with grid dots, then the border.
        let dot = CellStyle::fg(Rgb::new(90, 90, 100)).on(FIELD_BG).dim();
        for row in 0..FIELD_HEIGHT as u16 {
            for col in 0..FIELD_WIDTH as u16 {
                let px = x + 1 + col * cell_w;
                fb.fill_rect(px, field_y + 1 + row, cell_w, 1, ' ', dot);
                fb.put_char(px + cell_w - 1, field_y + 1 + row, '·', dot);
            }
        }
        fb.draw_border(x, field_y, frame_w, frame_h, CellStyle::fg(Rgb::new(200, 200, 200)));

        let mut painter = FieldPainter {
            fb: &mut *fb,
            origin_x: x + 1,
            origin_y: field_y + 1,
            cell_w,
            previews: Previews::default(),
        };
        panel.session.render(&mut painter);
        let previews = painter.previews;

        let panel_x = x + frame_w + 1;
        self.draw_side_panel(fb, panel, &previews, panel_x, field_y, frame_h);

        let overlay = if panel.session.game_over() {
            Some("GAME OVER")
        } else if paused {
            Some("PAUSED")
        } else {
            None
        };
        if let Some(text) = overlay {
            let style = CellStyle::fg(Rgb::new(255, 255, 255)).bold();
            fb.put_str_centered(x, frame_w, field_y + frame_h / 2, text, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        panel: &PlayerPanel<'_>,
        previews: &Previews,
        x: u16,
        y: u16,
        height: u16,
    ) {
        let label = CellStyle::default().bold();
        let value = CellStyle::fg(Rgb::new(200, 200, 200));
        let session = panel.session;
        let bottom = y + height;
        // Keep the last row free for the lock message.
        let preview_bottom = if panel.message.is_some() { bottom - 1 } else { bottom };

        let mut row = y;
        for (name, number) in [
            ("SCORE", session.score()),
            ("LINES", session.lines()),
            ("COMBO", session.combo()),
        ] {
            fb.put_str(x, row, name, label);
            fb.put_u32(x, row + 1, number, value);
            row += 2;
        }

        row += 1;
        fb.put_str(x, row, "HOLD", label);
        row += 1;
        match previews.hold {
            Some((config, mask)) => {
                let style = if session.hold().can_swap() {
                    CellStyle::fg(Rgb::for_piece(config.kind))
                } else {
                    CellStyle::fg(Rgb::for_piece(config.kind)).dim()
                };
                row += draw_mask(fb, x, row, &mask, style, bottom);
            }
            None => {
                fb.put_str(x, row, "-", value);
                row += 1;
            }
        }

        row += 1;
        if row < bottom {
            fb.put_str(x, row, "NEXT", label);
            row += 1;
        }
        for (config, mask) in previews.queue.iter().flatten() {
            if row >= preview_bottom {
                break;
            }
            let style = CellStyle::fg(Rgb::for_piece(config.kind));
            row += draw_mask(fb, x, row, mask, style, preview_bottom) + 1;
        }

        if let Some(message) = panel.message {
            let style = CellStyle::fg(Rgb::new(255, 230, 120)).bold();
            fb.put_str(x, bottom.saturating_sub(1), message, style);
        }
    }
}

/// Draw the occupied rows of a mask, two columns per cell. Returns the rows
/// used.
fn draw_mask(fb: &mut FrameBuffer, x: u16, y: u16, mask: &Mask, style: CellStyle, bottom: u16) -> u16 {
    let mut used = 0;
    for cols in mask.iter().filter(|cols| cols.iter().any(|&c| c)) {
        let row = y + used;
        if row >= bottom {
            break;
        }
        for (col, &occupied) in cols.iter().enumerate() {
            if occupied {
                fb.put_str(x + col as u16 * 2, row, "██", style);
            }
        }
        used += 1;
    }
    used
}

#[derive(Debug, Clone, Copy, Default)]
struct Previews {
    hold: Option<(PieceConfig, Mask)>,
    queue: [Option<(PieceConfig, Mask)>; QUEUE_LEN],
}

/// Block sink drawing one field at a fixed origin.
struct FieldPainter<'a> {
    fb: &'a mut FrameBuffer,
    origin_x: u16,
    origin_y: u16,
    cell_w: u16,
    previews: Previews,
}

impl BlockSink for FieldPainter<'_> {
    fn draw_block(&mut self, x: i8, y: i8, kind: PieceKind, style: BlockStyle) {
        if x < 0 || y < 0 || x >= FIELD_WIDTH as i8 || y >= FIELD_HEIGHT as i8 {
            return;
        }
        let (ch, cell_style) = match style {
            BlockStyle::Locked => ('█', CellStyle::fg(Rgb::for_piece(kind)).on(FIELD_BG)),
            BlockStyle::Active => ('█', CellStyle::fg(Rgb::for_piece(kind)).on(FIELD_BG).bold()),
            BlockStyle::Ghost => ('░', CellStyle::fg(Rgb::new(140, 140, 140)).on(FIELD_BG).dim()),
        };
        let px = self.origin_x + x as u16 * self.cell_w;
        let py = self.origin_y + y as u16;
        self.fb.fill_rect(px, py, self.cell_w, 1, ch, cell_style);
    }

    fn draw_preview(&mut self, slot: PreviewSlot, config: PieceConfig, mask: &Mask) {
        match slot {
            PreviewSlot::Hold => self.previews.hold = Some((config, *mask)),
            PreviewSlot::Queue(i) => {
                if let Some(entry) = self.previews.queue.get_mut(i) {
                    *entry = Some((config, *mask));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::{SchemeTable, Tuning};

    fn session(seed: u32) -> Session {
        Session::new(Arc::new(SchemeTable::builtin().unwrap()), Tuning::default(), seed)
    }

    fn count_glyph(fb: &FrameBuffer, ch: char) -> usize {
        fb.cells().iter().filter(|c| c.ch == ch).count()
    }

    #[test]
    fn single_player_draws_border_and_active_piece() {
        let s = session(1);
        let panels = [PlayerPanel {
            name: "P1",
            session: &s,
            message: None,
        }];
        let fb = GameView::default().render(&panels, false, Viewport::new(80, 24));

        assert_eq!(count_glyph(&fb, '┌'), 1);
        // Four active blocks two columns wide, plus the previews.
        assert!(count_glyph(&fb, '█') >= 8);
        assert_eq!(count_glyph(&fb, '░'), 8);
        assert!((0..24).any(|y| fb.row_text(y).contains("SCORE")));
    }

    #[test]
    fn four_players_fall_back_to_narrow_cells() {
        let sessions: Vec<Session> = (0..4).map(session).collect();
        let names = ["P1", "P2", "P3", "P4"];
        let panels: Vec<PlayerPanel<'_>> = sessions
            .iter()
            .zip(names)
            .map(|(session, name)| PlayerPanel {
                name,
                session,
                message: None,
            })
            .collect();

        let view = GameView::default();
        let viewport = Viewport::new(120, 24);
        assert_eq!(view.cell_width_for(4, viewport), 1);
        let fb = view.render(&panels, false, viewport);
        assert_eq!(count_glyph(&fb, '┌'), 4);
    }

    #[test]
    fn paused_overlay_and_message() {
        let s = session(2);
        let panels = [PlayerPanel {
            name: "P1",
            session: &s,
            message: Some("Tetris!"),
        }];
        let fb = GameView::default().render(&panels, true, Viewport::new(80, 24));
        let text: String = (0..24).map(|y| fb.row_text(y)).collect();
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Tetris!"));
    }
}
